//! Cart page.
//!
//! The cart lives on the backend; this page only renders the server's
//! snapshot. Quantity changes and removal are local stubs.

use askama::Template;
use tracing::{error, instrument};

use crate::api::FoodApi;
use crate::api::types::{CartLine, CartSnapshot};
use crate::page::{Document, LoadingTemplate, NotificationKind, render};
use crate::session::KeyValueStore;
use crate::state::AppState;

pub const CART_CONTAINER: &str = "cart-container";
pub const CART_SUMMARY: &str = "cart-summary";

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub index: usize,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub total: String,
}

/// Cart totals display data for templates.
#[derive(Debug, Clone)]
pub struct CartSummaryView {
    pub subtotal: String,
    pub delivery_fee: String,
    pub tax: String,
    pub total: String,
}

impl CartLineView {
    fn new(index: usize, line: &CartLine) -> Self {
        Self {
            index,
            name: line.name.clone(),
            price: line.price.to_fixed(),
            quantity: line.quantity.get(),
            total: line.total.to_fixed(),
        }
    }
}

impl From<&CartSnapshot> for CartSummaryView {
    fn from(cart: &CartSnapshot) -> Self {
        Self {
            subtotal: cart.subtotal.to_fixed(),
            delivery_fee: cart.delivery_fee.to_fixed(),
            tax: cart.tax.to_fixed(),
            total: cart.total.to_fixed(),
        }
    }
}

#[derive(Template)]
#[template(path = "cart/items.html")]
struct CartItemsTemplate {
    lines: Vec<CartLineView>,
}

#[derive(Template)]
#[template(path = "cart/summary.html")]
pub(crate) struct CartSummaryTemplate {
    pub summary: CartSummaryView,
    pub checkout_button: bool,
}

#[derive(Template)]
#[template(path = "cart/login_prompt.html")]
struct LoginPromptTemplate;

#[derive(Template)]
#[template(path = "cart/empty.html")]
pub(crate) struct EmptyCartTemplate;

#[derive(Template)]
#[template(path = "cart/error.html")]
pub(crate) struct CartErrorTemplate<'a> {
    pub message: &'a str,
}

/// Load the cart into `#cart-container` and `#cart-summary`.
#[instrument(skip_all)]
pub async fn load<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    if !doc.has(CART_CONTAINER) {
        return;
    }

    let session = state.session();
    let session_id = match session.get_session_id() {
        Some(id) if session.is_logged_in() => id,
        _ => {
            doc.set_html(CART_CONTAINER, render(&LoginPromptTemplate));
            return;
        }
    };

    doc.set_html(
        CART_CONTAINER,
        render(&LoadingTemplate {
            message: "Loading your cart...",
        }),
    );

    match state.api().get_cart(&session_id).await {
        Ok(cart) => display(doc, &cart),
        Err(e) => {
            error!(error = %e, "Failed to load cart");
            doc.set_html(
                CART_CONTAINER,
                render(&CartErrorTemplate {
                    message: &e.to_string(),
                }),
            );
        }
    }
}

fn display(doc: &mut Document, cart: &CartSnapshot) {
    if cart.is_empty() {
        doc.set_html(CART_CONTAINER, render(&EmptyCartTemplate));
        doc.clear(CART_SUMMARY);
        return;
    }

    let lines = cart
        .items
        .iter()
        .enumerate()
        .map(|(index, line)| CartLineView::new(index, line))
        .collect();
    doc.set_html(CART_CONTAINER, render(&CartItemsTemplate { lines }));
    doc.set_html(
        CART_SUMMARY,
        render(&CartSummaryTemplate {
            summary: CartSummaryView::from(cart),
            checkout_button: true,
        }),
    );
}

/// Quantity `-`/`+` control. Not backed by the server.
pub fn update_quantity<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
    index: usize,
    change: i32,
) {
    tracing::debug!(index, change, "Quantity change requested");
    doc.notify(
        "Quantity updated",
        NotificationKind::Info,
        state.notification_duration(),
    );
}

/// Remove control. Not backed by the server.
pub fn remove_item<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
    index: usize,
) {
    tracing::debug!(index, "Removal requested");
    doc.notify(
        "Item removed from cart",
        NotificationKind::Info,
        state.notification_duration(),
    );
}

/// "Proceed to Checkout". Carries no cart data; checkout refetches.
pub fn checkout<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    if state.session().is_logged_in() {
        doc.navigate("/checkout.html");
    } else {
        doc.navigate("/login.html?redirect=checkout.html");
    }
}

/// Drop the rendered cart.
pub fn teardown(doc: &mut Document) {
    doc.clear(CART_CONTAINER);
    doc.clear(CART_SUMMARY);
}
