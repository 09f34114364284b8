//! Checkout page: order summary and delivery form.

use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::api::FoodApi;
use crate::api::types::{OrderRequest, PlaceOrderOutcome};
use crate::error::add_breadcrumb;
use crate::page::{Document, LoadingTemplate, NotificationKind, render};
use crate::session::KeyValueStore;
use crate::state::AppState;

use super::auth::{begin_busy, end_busy, message_or};
use super::cart::{CartErrorTemplate, CartSummaryTemplate, CartSummaryView, EmptyCartTemplate};
use super::chrome;

pub const CHECKOUT_SUMMARY: &str = "checkout-summary";
pub const CHECKOUT_FORM: &str = "checkoutForm";

const LOGIN_WITH_HINT: &str = "/login.html?redirect=checkout.html";
const ORDER_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Render the order summary from a fresh cart fetch.
#[instrument(skip_all)]
pub async fn load<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    if !doc.has(CHECKOUT_SUMMARY) {
        return;
    }

    let session = state.session();
    let session_id = match session.get_session_id() {
        Some(id) if session.is_logged_in() => id,
        _ => {
            doc.navigate(LOGIN_WITH_HINT);
            return;
        }
    };

    doc.set_html(
        CHECKOUT_SUMMARY,
        render(&LoadingTemplate {
            message: "Loading your order...",
        }),
    );

    let html = match state.api().get_cart(&session_id).await {
        Ok(cart) if cart.is_empty() => render(&EmptyCartTemplate),
        Ok(cart) => render(&CartSummaryTemplate {
            summary: CartSummaryView::from(&cart),
            checkout_button: false,
        }),
        Err(e) => {
            error!(error = %e, "Failed to load checkout summary");
            render(&CartErrorTemplate {
                message: &e.to_string(),
            })
        }
    };
    doc.set_html(CHECKOUT_SUMMARY, html);
}

/// Handle `#checkoutForm` submission.
#[instrument(skip_all)]
pub async fn submit<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    let duration = state.notification_duration();
    let session = state.session();

    let (Some(session_id), Some(user)) = (session.get_session_id(), session.get_current_user())
    else {
        doc.navigate(LOGIN_WITH_HINT);
        return;
    };
    if !session.is_logged_in() {
        doc.navigate(LOGIN_WITH_HINT);
        return;
    }

    let address = doc.field_value("address").trim().to_owned();
    if address.is_empty() {
        doc.notify(
            "Please enter a delivery address",
            NotificationKind::Warning,
            duration,
        );
        return;
    }

    let order = OrderRequest {
        session_id,
        username: user.username,
        address,
        phone: non_empty(doc.field_value("phone")),
        payment_method: non_empty(doc.field_value("paymentMethod")),
    };

    let original = begin_busy(doc, CHECKOUT_FORM, "Placing order...");

    match state.api().place_order(&order).await {
        Ok(PlaceOrderOutcome::Placed { order_id, message }) => {
            let order_ref = order_id.to_string();
            info!(order_id = %order_ref, "Order placed");
            add_breadcrumb("order", "Placed order", Some(&[("order_id", order_ref.as_str())]));
            doc.notify(
                &message_or(message, "Order placed successfully!"),
                NotificationKind::Success,
                duration,
            );
            chrome::hide_cart_count(doc);
            doc.redirect_after(ORDER_REDIRECT_DELAY, "/profile.html");
        }
        Ok(PlaceOrderOutcome::Rejected { message }) => {
            warn!(?message, "Order rejected");
            doc.notify(
                &message_or(message, "Failed to place order"),
                NotificationKind::Error,
                duration,
            );
            end_busy(doc, CHECKOUT_FORM, original);
        }
        Err(e) => {
            error!(error = %e, "Order error");
            doc.notify(
                &format!("Failed to place order: {e}"),
                NotificationKind::Error,
                duration,
            );
            end_busy(doc, CHECKOUT_FORM, original);
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Drop the rendered summary.
pub fn teardown(doc: &mut Document) {
    doc.clear(CHECKOUT_SUMMARY);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use food_delivery_core::Role;
    use serde_json::json;

    use super::*;
    use crate::routes::{Event, dispatch, load_page};
    use crate::testing::{healthy, log_in, state};

    fn cart() -> serde_json::Value {
        json!({
            "items": [{"name": "Margherita", "price": 12.5, "quantity": 2, "total": 25}],
            "subtotal": 25, "deliveryFee": 3, "tax": 2.5, "total": 30.5, "itemCount": 2
        })
    }

    #[tokio::test]
    async fn test_logged_out_redirects_to_login() {
        let state = state(healthy());
        let doc = load_page(&state, "/checkout.html").await;
        assert_eq!(doc.navigation(), Some(LOGIN_WITH_HINT));
    }

    #[tokio::test]
    async fn test_summary_is_refetched() {
        let state = state(healthy().reply("get_cart", cart()));
        log_in(&state, "bob", Role::Customer);
        let doc = load_page(&state, "/checkout.html").await;

        let html = doc.by_id(CHECKOUT_SUMMARY).unwrap().inner();
        assert!(html.contains("$30.50"));
        assert!(!html.contains("data-action=\"checkout\""));
        // Badge plus summary
        assert_eq!(state.api().count("get_cart"), 2);
    }

    #[tokio::test]
    async fn test_empty_address_warns_without_call() {
        let state = state(healthy().reply("get_cart", cart()));
        log_in(&state, "bob", Role::Customer);
        let mut doc = load_page(&state, "/checkout.html").await;
        doc.set_field("address", "   ");

        dispatch(&state, &mut doc, Event::SubmitForm(CHECKOUT_FORM.to_string())).await;

        assert_eq!(state.api().count("place_order"), 0);
        assert_eq!(
            doc.last_notification(),
            Some((NotificationKind::Warning, "Please enter a delivery address"))
        );
    }

    #[tokio::test]
    async fn test_order_placed() {
        let state = state(
            healthy()
                .reply("get_cart", cart())
                .reply("place_order", json!({"success": true, "orderId": 42})),
        );
        log_in(&state, "bob", Role::Customer);
        let mut doc = load_page(&state, "/checkout.html").await;
        doc.set_field("address", "1 Main St");
        doc.set_field("paymentMethod", "CASH");

        dispatch(&state, &mut doc, Event::SubmitForm(CHECKOUT_FORM.to_string())).await;

        let calls = state.api().calls();
        let (_, body) = calls.iter().find(|(name, _)| *name == "place_order").unwrap();
        assert!(body.contains("\"address\":\"1 Main St\""));
        assert!(body.contains("\"paymentMethod\":\"CASH\""));
        assert!(!body.contains("phone"));

        assert_eq!(
            doc.last_notification(),
            Some((NotificationKind::Success, "Order placed successfully!"))
        );
        assert!(doc.by_class(chrome::CART_COUNT).next().unwrap().is_hidden());

        doc.advance(Duration::from_millis(2000));
        assert_eq!(doc.navigation(), Some("/profile.html"));
    }

    #[tokio::test]
    async fn test_order_rejected_restores_button() {
        let state = state(
            healthy()
                .reply("get_cart", cart())
                .reply("place_order", json!({"success": false, "message": "Cart is empty"})),
        );
        log_in(&state, "bob", Role::Customer);
        let mut doc = load_page(&state, "/checkout.html").await;
        doc.set_field("address", "1 Main St");

        dispatch(&state, &mut doc, Event::SubmitForm(CHECKOUT_FORM.to_string())).await;

        assert_eq!(
            doc.last_notification(),
            Some((NotificationKind::Error, "Cart is empty"))
        );
        let button = doc.submit_button_mut(CHECKOUT_FORM).unwrap();
        assert_eq!(button.inner(), "Place Order");
        assert!(!button.is_disabled());
    }
}
