//! Header chrome shared by every page: API status, user display, cart badge.

use std::time::Duration;

use askama::Template;
use tracing::{error, info, instrument};

use crate::api::FoodApi;
use crate::api::types::{HealthStatus, User};
use crate::page::{Document, NotificationKind, render};
use crate::session::KeyValueStore;
use crate::state::AppState;

use super::Route;

pub const API_STATUS: &str = "api-status";
pub const CART_COUNT: &str = "cart-count";
pub const USER_DISPLAY: &str = "user-display";
pub const LOGIN_BUTTON: &str = "login-btn";
pub const LOGOUT_BUTTON: &str = "logout-btn";

/// How long the "server is down" warning stays up.
const OFFLINE_NOTIFICATION: Duration = Duration::from_millis(10_000);

/// Counts shown in the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthView {
    pub users: u64,
    pub menu_items: u64,
}

impl From<&HealthStatus> for HealthView {
    fn from(health: &HealthStatus) -> Self {
        Self {
            users: health.user_count.unwrap_or(0),
            menu_items: health.menu_item_count.unwrap_or(0),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/api_status.html")]
struct ApiStatusTemplate {
    status: Option<HealthView>,
}

/// Run the chrome part of page initialization.
pub async fn init<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
    route: Option<Route>,
) {
    check_api_status(state, doc, route).await;

    if let Some(user) = state.session().get_current_user() {
        update_user_ui(doc, &user);
    }

    refresh_cart_count(state, doc).await;
}

/// Probe the backend and render the status indicator.
#[instrument(skip_all)]
pub async fn check_api_status<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
    route: Option<Route>,
) {
    match state.api().test_connection().await {
        Ok(health) => {
            info!(?health.status, "API connection successful");
            doc.set_html(
                API_STATUS,
                render(&ApiStatusTemplate {
                    status: Some(HealthView::from(&health)),
                }),
            );
        }
        Err(e) => {
            error!(error = %e, "API connection failed");
            doc.set_html(API_STATUS, render(&ApiStatusTemplate { status: None }));

            if route != Some(Route::Login) {
                doc.notify(
                    "Backend server is not running. Please start the server.",
                    NotificationKind::Error,
                    OFFLINE_NOTIFICATION,
                );
            }
        }
    }
}

/// Show the logged-in user and swap the login/logout controls.
pub fn update_user_ui(doc: &mut Document, user: &User) {
    for el in doc.by_class_mut(USER_DISPLAY) {
        el.set_text(user.username.clone());
    }
    if let Some(login) = doc.by_class_mut(LOGIN_BUTTON).next() {
        login.set_hidden(true);
    }
    if let Some(logout) = doc.by_class_mut(LOGOUT_BUTTON).next() {
        logout.set_hidden(false);
    }
}

/// Set every cart badge to `count`, visible only when non-zero.
pub fn set_cart_count(doc: &mut Document, count: u32) {
    for badge in doc.by_class_mut(CART_COUNT) {
        badge.set_text(count.to_string());
        badge.set_hidden(count == 0);
    }
}

/// Hide every cart badge.
pub fn hide_cart_count(doc: &mut Document) {
    for badge in doc.by_class_mut(CART_COUNT) {
        badge.set_hidden(true);
    }
}

/// Fetch the cart and update the badge; hidden when logged out or on failure.
pub async fn refresh_cart_count<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    doc: &mut Document,
) {
    let session = state.session();
    let Some(session_id) = session.get_session_id().filter(|_| session.is_logged_in()) else {
        hide_cart_count(doc);
        return;
    };

    match state.api().get_cart(&session_id).await {
        Ok(cart) => set_cart_count(doc, cart.item_count),
        Err(_) => hide_cart_count(doc),
    }
}
