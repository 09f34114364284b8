//! Profile page: account details and order history.
//!
//! Load failures here are logged and otherwise silent.

use askama::Template;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::{error, instrument};

use food_delivery_core::OrderId;

use crate::api::FoodApi;
use crate::api::types::{Order, Profile};
use crate::page::{Document, NotificationKind, render};
use crate::session::KeyValueStore;
use crate::state::AppState;

pub const PROFILE_INFO: &str = "profile-info";
pub const ORDER_HISTORY: &str = "order-history";

/// Addresses are cut to this many characters on order cards.
const ADDRESS_PREVIEW_CHARS: usize = 50;

// =============================================================================
// View Models
// =============================================================================

/// Profile display data for templates.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub role_class: String,
}

fn or_not_set(value: Option<&String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map_or_else(|| "Not set".to_owned(), Clone::clone)
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            email: or_not_set(profile.email.as_ref()),
            phone: or_not_set(profile.phone.as_ref()),
            role: profile.role.to_string(),
            role_class: profile.role.css_class(),
        }
    }
}

/// Order card display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub number: String,
    pub status: String,
    pub status_class: String,
    pub date: String,
    pub total: String,
    pub address: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.order_id.to_string(),
            number: order.order_number.clone(),
            status: order.status.to_string(),
            status_class: order.status.css_class(),
            date: format_order_date(&order.created_at),
            total: order.total_amount.to_fixed(),
            address: address_preview(&order.delivery_address),
        }
    }
}

/// Format a backend timestamp as `M/D/YYYY`, or `Invalid Date`.
pub fn format_order_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    date.map_or_else(
        |_| "Invalid Date".to_owned(),
        |d| format!("{}/{}/{}", d.month(), d.day(), d.year()),
    )
}

/// First 50 characters of an address, always followed by `...`.
pub fn address_preview(address: &str) -> String {
    let mut preview: String = address.chars().take(ADDRESS_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

#[derive(Template)]
#[template(path = "account/profile.html")]
struct ProfileTemplate {
    profile: ProfileView,
}

#[derive(Template)]
#[template(path = "account/orders.html")]
struct OrdersTemplate {
    orders: Vec<OrderView>,
}

#[derive(Template)]
#[template(path = "account/orders_empty.html")]
struct NoOrdersTemplate;

// =============================================================================
// Handlers
// =============================================================================

/// Load the profile into `#profile-info`. Without a user, go to login.
#[instrument(skip_all)]
pub async fn load_profile<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
) {
    let Some(user) = state.session().get_current_user() else {
        doc.navigate("/login.html?redirect=profile.html");
        return;
    };

    match state.api().get_user_profile(&user.username).await {
        Ok(profile) => {
            doc.set_html(
                PROFILE_INFO,
                render(&ProfileTemplate {
                    profile: ProfileView::from(&profile),
                }),
            );
        }
        Err(e) => error!(error = %e, "Failed to load profile"),
    }
}

/// Load past orders into `#order-history`.
#[instrument(skip_all)]
pub async fn load_order_history<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
) {
    let Some(user) = state.session().get_current_user() else {
        return;
    };

    match state.api().get_orders(&user.username).await {
        Ok(orders) if orders.is_empty() => {
            doc.set_html(ORDER_HISTORY, render(&NoOrdersTemplate));
        }
        Ok(orders) => {
            let html = render(&OrdersTemplate {
                orders: orders.iter().map(OrderView::from).collect(),
            });
            doc.set_html(ORDER_HISTORY, html);
        }
        Err(e) => error!(error = %e, "Failed to load orders"),
    }
}

/// "View Details" on an order card.
pub fn view_order_details<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
    order_id: OrderId,
) {
    doc.notify(
        &format!("Order details for #{order_id} would be shown here"),
        NotificationKind::Info,
        state.notification_duration(),
    );
}

pub fn teardown(doc: &mut Document) {
    doc.clear(PROFILE_INFO);
    doc.clear(ORDER_HISTORY);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use food_delivery_core::Role;
    use serde_json::json;

    use super::*;
    use crate::routes::{Event, dispatch, load_page};
    use crate::testing::{healthy, log_in, state};

    fn order(id: i32, status: &str, created_at: &str, address: &str) -> serde_json::Value {
        json!({
            "orderId": id,
            "orderNumber": format!("ORD-{id}"),
            "status": status,
            "createdAt": created_at,
            "totalAmount": 30.5,
            "deliveryAddress": address
        })
    }

    #[test]
    fn test_address_preview_quirk() {
        assert_eq!(address_preview("1 Main St"), "1 Main St...");

        let long = "a".repeat(60);
        let preview = address_preview(&long);
        assert_eq!(preview, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_address_preview_counts_chars() {
        let address = "é".repeat(55);
        assert_eq!(address_preview(&address).chars().count(), 53);
    }

    #[test]
    fn test_format_order_date() {
        assert_eq!(format_order_date("2024-03-05T18:30:00Z"), "3/5/2024");
        assert_eq!(format_order_date("2024-12-25 09:15:00"), "12/25/2024");
        assert_eq!(format_order_date("2024-01-09T10:00:00"), "1/9/2024");
        assert_eq!(format_order_date("2024-07-04"), "7/4/2024");
        assert_eq!(format_order_date("yesterday"), "Invalid Date");
        assert_eq!(format_order_date(""), "Invalid Date");
    }

    #[tokio::test]
    async fn test_profile_requires_user() {
        let state = state(healthy());
        let doc = load_page(&state, "/profile.html").await;

        assert_eq!(doc.navigation(), Some("/login.html?redirect=profile.html"));
        assert_eq!(state.api().count("get_user_profile"), 0);
        assert_eq!(state.api().count("get_orders"), 0);
    }

    #[tokio::test]
    async fn test_profile_rendering() {
        let state = state(
            healthy()
                .reply(
                    "get_user_profile",
                    json!({"username": "bob", "email": "", "role": "CUSTOMER"}),
                )
                .reply("get_orders", json!([])),
        );
        log_in(&state, "bob", Role::Customer);
        let doc = load_page(&state, "/profile.html").await;

        let html = doc.by_id(PROFILE_INFO).unwrap().inner();
        assert!(html.contains("<span>bob</span>"));
        assert_eq!(html.matches("Not set").count(), 2);
        assert!(html.contains("role-badge customer"));
        assert!(html.contains(">CUSTOMER<"));
    }

    #[tokio::test]
    async fn test_empty_order_history() {
        let state = state(
            healthy()
                .fail("get_user_profile", 500, "boom")
                .reply("get_orders", json!([])),
        );
        log_in(&state, "bob", Role::Customer);
        let doc = load_page(&state, "/profile.html").await;

        assert_eq!(doc.by_id(PROFILE_INFO).unwrap().inner(), "");
        let html = doc.by_id(ORDER_HISTORY).unwrap().inner();
        assert!(html.contains("No orders yet"));
        assert_eq!(doc.notifications().count(), 0);
    }

    #[tokio::test]
    async fn test_order_cards() {
        let state = state(
            healthy()
                .reply("get_user_profile", json!({"username": "bob", "role": "CUSTOMER"}))
                .reply(
                    "get_orders",
                    json!([
                        order(7, "DELIVERED", "2024-03-05T18:30:00Z", "1 Main St"),
                        order(8, "Pending", "not a date", &"x".repeat(80)),
                    ]),
                ),
        );
        log_in(&state, "bob", Role::Customer);
        let mut doc = load_page(&state, "/profile.html").await;

        let html = doc.by_id(ORDER_HISTORY).unwrap().inner().to_owned();
        assert_eq!(html.matches("class=\"order-card\"").count(), 2);
        assert!(html.contains("Order #ORD-7"));
        assert!(html.contains("order-status delivered"));
        assert!(html.contains("order-status pending"));
        assert!(html.contains("3/5/2024"));
        assert!(html.contains("Invalid Date"));
        assert!(html.contains("$30.50"));
        assert!(html.contains("1 Main St..."));
        assert!(html.contains(&format!("{}...", "x".repeat(50))));
        assert!(!html.contains(&"x".repeat(51)));
        assert!(html.find("ORD-7").unwrap() < html.find("ORD-8").unwrap());

        dispatch(&state, &mut doc, Event::ViewOrderDetails(OrderId::new(7))).await;
        assert_eq!(
            doc.last_notification(),
            Some((
                NotificationKind::Info,
                "Order details for #7 would be shown here"
            ))
        );
    }

    #[tokio::test]
    async fn test_order_failure_is_silent() {
        let state = state(
            healthy()
                .reply("get_user_profile", json!({"username": "bob", "role": "CUSTOMER"}))
                .fail("get_orders", 500, "boom"),
        );
        log_in(&state, "bob", Role::Customer);
        let doc = load_page(&state, "/profile.html").await;

        assert_eq!(doc.by_id(ORDER_HISTORY).unwrap().inner(), "");
        assert_eq!(doc.notifications().count(), 0);
    }
}
