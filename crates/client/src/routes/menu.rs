//! Menu page: item cards, category filters, search and add-to-cart.

use std::time::Duration;

use askama::Template;
use tracing::{error, instrument};

use food_delivery_core::MenuItemId;

use crate::api::FoodApi;
use crate::api::types::{AddToCartOutcome, CartItemRequest, MenuItem};
use crate::error::add_breadcrumb;
use crate::page::{Document, LoadingTemplate, NotificationKind, render};
use crate::session::KeyValueStore;
use crate::state::AppState;

use super::{ViewState, chrome};

pub const MENU_CONTAINER: &str = "menu-container";
pub const CATEGORY_FILTERS: &str = "category-filters";
pub const SEARCH_INPUT: &str = "searchInput";

/// Image shown for items without one.
pub const DEFAULT_IMAGE: &str = "images/food/default.jpg";

/// Filter value that matches every category.
pub const ALL_CATEGORIES: &str = "all";

const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Menu data kept between events on one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    items: Vec<MenuItem>,
    categories: Vec<String>,
    category: String,
    query: String,
}

impl MenuState {
    fn new(items: Vec<MenuItem>) -> Self {
        Self {
            items,
            categories: Vec::new(),
            category: ALL_CATEGORIES.to_owned(),
            query: String::new(),
        }
    }

    /// Items passing the active category filter and search query.
    pub fn visible(&self) -> impl Iterator<Item = &MenuItem> {
        let query = self.query.trim().to_lowercase();
        self.items.iter().filter(move |item| {
            (self.category == ALL_CATEGORIES || item.category == self.category)
                && (query.is_empty() || matches_query(item, &query))
        })
    }
}

/// Case-insensitive substring match over name, description and category.
fn matches_query(item: &MenuItem, query: &str) -> bool {
    [&item.name, &item.description, &item.category]
        .iter()
        .any(|field| field.to_lowercase().contains(query))
}

// =============================================================================
// View Models
// =============================================================================

/// Menu card display data for templates.
#[derive(Debug, Clone)]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
    pub vegetarian: bool,
    pub factory_type: String,
}

impl From<&MenuItem> for MenuItemView {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.to_fixed(),
            category: item.category.clone(),
            image_url: item
                .image_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_owned()),
            vegetarian: item.vegetarian,
            factory_type: item.factory_type.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "menu/items.html")]
struct MenuItemsTemplate {
    items: Vec<MenuItemView>,
}

#[derive(Template)]
#[template(path = "menu/error.html")]
struct MenuErrorTemplate;

#[derive(Template)]
#[template(path = "menu/filters.html")]
struct FiltersTemplate<'a> {
    categories: &'a [String],
    active: &'a str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Load the menu into `#menu-container`, then the category filters.
#[instrument(skip_all)]
pub async fn load<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    if !doc.has(MENU_CONTAINER) {
        return;
    }

    doc.set_html(
        MENU_CONTAINER,
        render(&LoadingTemplate {
            message: "Loading delicious menu...",
        }),
    );

    match state.api().get_menu().await {
        Ok(items) => {
            doc.view = ViewState::Menu(MenuState::new(items));
            render_items(doc);
            load_categories(state, doc).await;
        }
        Err(e) => {
            error!(error = %e, "Failed to load menu");
            doc.view = ViewState::Idle;
            doc.set_html(MENU_CONTAINER, render(&MenuErrorTemplate));
        }
    }
}

async fn load_categories<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
) {
    if !doc.has(CATEGORY_FILTERS) {
        return;
    }

    match state.api().get_categories().await {
        Ok(categories) => {
            if let ViewState::Menu(menu) = &mut doc.view {
                menu.categories = categories.into_iter().map(|c| c.name).collect();
            }
            render_filters(doc);
        }
        Err(e) => error!(error = %e, "Failed to load categories"),
    }
}

fn render_items(doc: &mut Document) {
    let ViewState::Menu(menu) = &doc.view else {
        return;
    };
    let html = render(&MenuItemsTemplate {
        items: menu.visible().map(MenuItemView::from).collect(),
    });
    doc.set_html(MENU_CONTAINER, html);
}

fn render_filters(doc: &mut Document) {
    let ViewState::Menu(menu) = &doc.view else {
        return;
    };
    let html = render(&FiltersTemplate {
        categories: &menu.categories,
        active: &menu.category,
    });
    doc.set_html(CATEGORY_FILTERS, html);
}

/// Handle input in `#searchInput`.
pub fn search(doc: &mut Document, query: &str) {
    doc.set_field(SEARCH_INPUT, query);
    if let ViewState::Menu(menu) = &mut doc.view {
        query.clone_into(&mut menu.query);
        render_items(doc);
    }
}

/// Handle a `.filter-btn` click.
pub fn filter(doc: &mut Document, category: &str) {
    let ViewState::Menu(menu) = &mut doc.view else {
        return;
    };
    if category != ALL_CATEGORIES && !menu.categories.iter().any(|c| c == category) {
        return;
    }
    category.clone_into(&mut menu.category);
    render_items(doc);
    render_filters(doc);
}

/// Items the menu currently shows, in menu order.
///
/// Empty if the page has no loaded menu.
pub fn visible_items(doc: &Document) -> Vec<&MenuItem> {
    match &doc.view {
        ViewState::Menu(menu) => menu.visible().collect(),
        ViewState::Idle => Vec::new(),
    }
}

/// Add one unit of an item to the backend cart.
#[instrument(skip(state, doc))]
pub async fn add_to_cart<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
    item_id: MenuItemId,
    food_type: &str,
    item_name: &str,
) {
    let duration = state.notification_duration();
    let session = state.session();

    let session_id = match session.get_session_id() {
        Some(id) if session.is_logged_in() => id,
        _ => {
            doc.notify(
                "Please login first to add items to cart",
                NotificationKind::Warning,
                duration,
            );
            doc.redirect_after(LOGIN_REDIRECT_DELAY, "/login.html?redirect=menu.html");
            return;
        }
    };

    let request = CartItemRequest {
        item_id,
        food_type: food_type.to_owned(),
        quantity: 1,
    };

    match state.api().add_to_cart(&session_id, &request).await {
        Ok(AddToCartOutcome::Added { item_count, .. }) => {
            add_breadcrumb("cart", "Added item", Some(&[("item_name", item_name)]));
            doc.notify(
                &format!("{item_name} added to cart!"),
                NotificationKind::Success,
                duration,
            );
            chrome::set_cart_count(doc, item_count);
        }
        Ok(AddToCartOutcome::Rejected { message }) => {
            error!(?message, "Add to cart rejected");
            doc.notify("Failed to add item to cart", NotificationKind::Error, duration);
        }
        Err(e) => {
            error!(error = %e, "Add to cart error");
            doc.notify("Failed to add item to cart", NotificationKind::Error, duration);
        }
    }
}

/// Drop the rendered menu and per-load data.
pub fn teardown(doc: &mut Document) {
    doc.clear(MENU_CONTAINER);
    doc.clear(CATEGORY_FILTERS);
    doc.view = ViewState::Idle;
}
