//! Page controllers.
//!
//! # Route Table
//!
//! ```text
//! /  /index.html          - Home (chrome only)
//! /login.html             - Login form
//! /register.html          - Registration form
//! /menu.html              - Menu, category filters, search
//! /cart.html              - Cart lines and summary
//! /checkout.html          - Order summary and delivery form
//! /profile.html           - Profile and order history
//! /admin/dashboard.html   - Admin landing page (chrome only)
//! ```
//!
//! Paths are normalized before lookup: the leading `/` and a trailing
//! `.html` are dropped, so `/menu` and `/menu.html` are the same route.
//! Paths not in the table load the chrome and run no view loader.

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod chrome;
pub mod menu;

use food_delivery_core::{MenuItemId, OrderId};
use tracing::{debug, instrument};

use crate::api::FoodApi;
use crate::page::{Document, Location, layout};
use crate::session::KeyValueStore;
use crate::state::AppState;

/// A view in the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Menu,
    Cart,
    Checkout,
    Profile,
    AdminDashboard,
}

const ROUTES: &[(&str, Route)] = &[
    ("", Route::Home),
    ("index", Route::Home),
    ("login", Route::Login),
    ("register", Route::Register),
    ("menu", Route::Menu),
    ("cart", Route::Cart),
    ("checkout", Route::Checkout),
    ("profile", Route::Profile),
    ("admin/dashboard", Route::AdminDashboard),
];

impl Route {
    /// Look up the view served at `path`.
    #[must_use]
    pub fn resolve(path: &str) -> Option<Self> {
        let key = path.trim_start_matches('/');
        let key = key.strip_suffix(".html").unwrap_or(key);

        ROUTES
            .iter()
            .find(|(route_key, _)| *route_key == key)
            .map(|(_, route)| *route)
    }

    /// Run the view's loader against a freshly built page.
    pub async fn init<A: FoodApi, K: KeyValueStore>(
        self,
        state: &AppState<A, K>,
        doc: &mut Document,
    ) {
        match self {
            Self::Menu => menu::load(state, doc).await,
            Self::Cart => cart::load(state, doc).await,
            Self::Checkout => checkout::load(state, doc).await,
            Self::Profile => {
                account::load_profile(state, doc).await;
                account::load_order_history(state, doc).await;
            }
            Self::Home | Self::Login | Self::Register | Self::AdminDashboard => {}
        }
    }

    /// Drop what the view rendered and any per-load state.
    pub fn teardown(self, doc: &mut Document) {
        match self {
            Self::Menu => menu::teardown(doc),
            Self::Cart => cart::teardown(doc),
            Self::Checkout => checkout::teardown(doc),
            Self::Profile => account::teardown(doc),
            Self::Home | Self::Login | Self::Register | Self::AdminDashboard => {}
        }
    }
}

/// Per-load data a view keeps between events.
#[derive(Debug, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Menu(menu::MenuState),
}

/// A user interaction on the loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Submit the form with this id.
    SubmitForm(String),
    /// Click `#logoutBtn`.
    Logout,
    /// Type into `#searchInput`.
    Search(String),
    /// Click a `.filter-btn` with this `data-category`.
    Filter(String),
    /// Click a menu card's add-to-cart control.
    AddToCart {
        item_id: MenuItemId,
        food_type: String,
        item_name: String,
    },
    /// Click a cart line's `-`/`+` control.
    UpdateQuantity { index: usize, change: i32 },
    /// Click a cart line's remove control.
    RemoveItem { index: usize },
    /// Click "Proceed to Checkout".
    Checkout,
    /// Click "Try Again" on the menu error state.
    RetryMenu,
    /// Click "View Details" on an order card.
    ViewOrderDetails(OrderId),
}

/// Build and initialize the page at `target`.
///
/// Order: layout, API status, user chrome, cart badge, view loader.
#[instrument(skip(state))]
pub async fn load_page<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    target: &str,
) -> Document {
    let location = Location::parse(target);
    let route = Route::resolve(location.path());
    let mut doc = layout::build(location, route);

    chrome::init(state, &mut doc, route).await;

    if let Some(route) = route {
        route.init(state, &mut doc).await;
    } else {
        debug!(path = %doc.location().path(), "No view registered for path");
    }

    doc
}

/// Unload the page's view.
pub fn teardown(doc: &mut Document) {
    if let Some(route) = Route::resolve(doc.location().path()) {
        route.teardown(doc);
    }
}

/// Route an event to its handler.
///
/// Events whose target element is not on the page are ignored.
#[instrument(skip(state, doc), fields(path = %doc.location().path()))]
pub async fn dispatch<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
    event: Event,
) {
    match event {
        Event::SubmitForm(form) if doc.has(&form) => match form.as_str() {
            auth::LOGIN_FORM => auth::login(state, doc).await,
            auth::REGISTER_FORM => auth::register(state, doc).await,
            checkout::CHECKOUT_FORM => checkout::submit(state, doc).await,
            _ => debug!(form, "No handler for form"),
        },
        Event::Logout if doc.has(auth::LOGOUT_BUTTON) => auth::logout(state, doc),
        Event::Search(query) if doc.has(menu::SEARCH_INPUT) => menu::search(doc, &query),
        Event::Filter(category) if doc.has(menu::CATEGORY_FILTERS) => {
            menu::filter(doc, &category);
        }
        Event::AddToCart {
            item_id,
            food_type,
            item_name,
        } if doc.has(menu::MENU_CONTAINER) => {
            menu::add_to_cart(state, doc, item_id, &food_type, &item_name).await;
        }
        Event::UpdateQuantity { index, change } if doc.has(cart::CART_CONTAINER) => {
            cart::update_quantity(state, doc, index, change);
        }
        Event::RemoveItem { index } if doc.has(cart::CART_CONTAINER) => {
            cart::remove_item(state, doc, index);
        }
        Event::Checkout if doc.has(cart::CART_SUMMARY) => cart::checkout(state, doc),
        Event::RetryMenu if doc.has(menu::MENU_CONTAINER) => menu::load(state, doc).await,
        Event::ViewOrderDetails(order_id) if doc.has(account::ORDER_HISTORY) => {
            account::view_order_details(state, doc, order_id);
        }
        event => debug!(?event, "Event target not on page"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, healthy, state};

    #[test]
    fn test_route_resolution_normalizes_paths() {
        assert_eq!(Route::resolve("/menu.html"), Some(Route::Menu));
        assert_eq!(Route::resolve("/menu"), Some(Route::Menu));
        assert_eq!(Route::resolve("menu.html"), Some(Route::Menu));
        assert_eq!(Route::resolve("/"), Some(Route::Home));
        assert_eq!(Route::resolve("/index.html"), Some(Route::Home));
        assert_eq!(
            Route::resolve("/admin/dashboard.html"),
            Some(Route::AdminDashboard)
        );
        assert_eq!(Route::resolve("/menu.html.bak"), None);
        assert_eq!(Route::resolve("/about.html"), None);
    }

    #[tokio::test]
    async fn test_unknown_path_runs_no_loader() {
        let state = state(healthy());
        let doc = load_page(&state, "/about.html").await;

        assert!(doc.has("api-status"));
        assert!(!doc.has("menu-container"));
        assert_eq!(state.api().count("get_menu"), 0);
    }

    #[tokio::test]
    async fn test_event_without_target_is_ignored() {
        let state = state(healthy());
        let mut doc = load_page(&state, "/index.html").await;

        dispatch(&state, &mut doc, Event::SubmitForm("loginForm".to_string())).await;
        dispatch(&state, &mut doc, Event::RetryMenu).await;

        assert_eq!(state.api().count("login"), 0);
        assert_eq!(state.api().count("get_menu"), 0);
    }

    #[tokio::test]
    async fn test_teardown_clears_view_state() {
        let api = FakeApi::new()
            .reply("test_connection", serde_json::json!({}))
            .reply("get_menu", serde_json::json!([]))
            .reply("get_categories", serde_json::json!([]));
        let state = state(api);
        let mut doc = load_page(&state, "/menu.html").await;
        assert!(matches!(doc.view, ViewState::Menu(_)));

        teardown(&mut doc);

        assert!(matches!(doc.view, ViewState::Idle));
        assert_eq!(doc.by_id("menu-container").unwrap().inner(), "");
    }
}
