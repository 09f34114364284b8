//! Login, registration and logout flows.

use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::api::FoodApi;
use crate::api::types::{LoginOutcome, LoginSession, RegisterOutcome, Registration};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::page::{Content, Document, NotificationKind};
use crate::session::KeyValueStore;
use crate::state::AppState;

pub const LOGIN_FORM: &str = "loginForm";
pub const REGISTER_FORM: &str = "registerForm";
pub const LOGOUT_BUTTON: &str = "logoutBtn";

const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);
const REGISTER_REDIRECT_DELAY: Duration = Duration::from_millis(2000);
const LOGOUT_REDIRECT_DELAY: Duration = Duration::from_millis(1000);

const ADMIN_HOME: &str = "/admin/dashboard.html";
const CUSTOMER_HOME: &str = "/menu.html";

/// Swap a form's submit button to a spinner label and disable it.
///
/// Returns the previous content so it can be restored.
pub(crate) fn begin_busy(doc: &mut Document, form_id: &str, label: &str) -> Option<Content> {
    let button = doc.submit_button_mut(form_id)?;
    let original = button.content().clone();
    button.set_html(format!(r#"<i class="fas fa-spinner fa-spin"></i> {label}"#));
    button.set_disabled(true);
    Some(original)
}

/// Put a submit button back the way [`begin_busy`] found it.
pub(crate) fn end_busy(doc: &mut Document, form_id: &str, original: Option<Content>) {
    if let (Some(button), Some(original)) = (doc.submit_button_mut(form_id), original) {
        button.set_content(original);
        button.set_disabled(false);
    }
}

/// Server message, unless it is missing or blank.
pub(crate) fn message_or(message: Option<String>, fallback: &str) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

/// Handle `#loginForm` submission.
#[instrument(skip_all)]
pub async fn login<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    let username = doc.field_value("username");
    let password = doc.field_value("password");
    let duration = state.notification_duration();

    let original = begin_busy(doc, LOGIN_FORM, "Logging in...");

    match state.api().login(&username, &password).await {
        Ok(LoginOutcome::Accepted(session)) => {
            if let Err(e) = persist_session(state, &session) {
                error!(error = %e, "Failed to persist session");
                doc.notify("Login failed", NotificationKind::Error, duration);
                end_busy(doc, LOGIN_FORM, original);
                return;
            }

            let user = &session.user;
            set_sentry_user(&user.username, Some(user.email.as_str()));
            add_breadcrumb("auth", "Logged in", Some(&[("role", user.role.as_str())]));
            info!(username = %user.username, role = %user.role, "Login successful");

            doc.notify("Login successful!", NotificationKind::Success, duration);

            let home = if user.role.is_admin() {
                ADMIN_HOME
            } else {
                CUSTOMER_HOME
            };
            doc.redirect_after(LOGIN_REDIRECT_DELAY, home);
        }
        Ok(LoginOutcome::Rejected { message }) => {
            warn!(?message, "Login rejected");
            doc.notify(
                &message_or(message, "Login failed"),
                NotificationKind::Error,
                duration,
            );
            end_busy(doc, LOGIN_FORM, original);
        }
        Err(e) => {
            error!(error = %e, "Login error");
            doc.notify(
                "Connection error. Please check if server is running.",
                NotificationKind::Error,
                duration,
            );
            end_busy(doc, LOGIN_FORM, original);
        }
    }
}

fn persist_session<A: FoodApi, K: KeyValueStore>(
    state: &AppState<A, K>,
    session: &LoginSession,
) -> crate::session::StorageResult<()> {
    state
        .session()
        .set_session(&session.session_id, &session.user)
}

/// Handle `#registerForm` submission.
#[instrument(skip_all)]
pub async fn register<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    let registration = Registration {
        username: doc.field_value("username"),
        password: doc.field_value("password"),
        email: doc.field_value("email"),
        full_name: doc.field_value("fullName"),
        phone: doc.field_value("phone"),
    };
    let duration = state.notification_duration();

    let original = begin_busy(doc, REGISTER_FORM, "Creating account...");

    match state.api().register(&registration).await {
        Ok(RegisterOutcome::Registered { .. }) => {
            info!(username = %registration.username, "Account created");
            doc.notify(
                "Account created successfully! Please login.",
                NotificationKind::Success,
                duration,
            );
            doc.redirect_after(REGISTER_REDIRECT_DELAY, "/login.html");
        }
        Ok(RegisterOutcome::Rejected { message }) => {
            warn!(?message, "Registration rejected");
            doc.notify(
                &message_or(message, "Registration failed"),
                NotificationKind::Error,
                duration,
            );
            end_busy(doc, REGISTER_FORM, original);
        }
        Err(e) => {
            error!(error = %e, "Registration error");
            doc.notify(
                "Connection error. Please try again.",
                NotificationKind::Error,
                duration,
            );
            end_busy(doc, REGISTER_FORM, original);
        }
    }
}

/// Handle a `#logoutBtn` click. Purely local; the backend is not told.
#[instrument(skip_all)]
pub fn logout<A: FoodApi, K: KeyValueStore>(state: &AppState<A, K>, doc: &mut Document) {
    if let Err(e) = state.session().clear_session() {
        error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    doc.notify(
        "Logged out successfully",
        NotificationKind::Info,
        state.notification_duration(),
    );
    doc.redirect_after(LOGOUT_REDIRECT_DELAY, "/index.html");
}
