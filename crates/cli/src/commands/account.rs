//! Login, registration, logout and order history.

use tracing::info;

use food_delivery_client::FoodApi;
use food_delivery_client::routes::account::{address_preview, format_order_date};
use food_delivery_client::routes::{Event, auth};

use super::{CliBrowser, CliState, CommandError, outcome};

/// Submit the login form and follow the post-login redirect.
///
/// # Errors
///
/// Returns `CommandError::Rejected` with the page's message if login fails.
pub async fn login(state: CliState, username: &str, password: &str) -> Result<(), CommandError> {
    let mut browser = CliBrowser::open(state, "/login.html").await;
    browser.fill("username", username);
    browser.fill("password", password);
    browser
        .dispatch(Event::SubmitForm(auth::LOGIN_FORM.to_owned()))
        .await;
    outcome(browser.page())?;

    browser.settle().await;
    info!(username, landing = %browser.page().location(), "Logged in");
    Ok(())
}

/// Registration form contents.
#[derive(Debug)]
pub struct RegisterArgs {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
}

/// Submit the registration form.
///
/// # Errors
///
/// Returns `CommandError::Rejected` with the page's message if the backend
/// refuses the registration.
pub async fn register(state: CliState, args: RegisterArgs) -> Result<(), CommandError> {
    let mut browser = CliBrowser::open(state, "/register.html").await;
    for (field, value) in [
        ("username", &args.username),
        ("password", &args.password),
        ("email", &args.email),
        ("fullName", &args.full_name),
        ("phone", &args.phone),
    ] {
        browser.fill(field, value);
    }
    browser
        .dispatch(Event::SubmitForm(auth::REGISTER_FORM.to_owned()))
        .await;
    outcome(browser.page())?;

    browser.settle().await;
    info!(username = %args.username, "Registered; log in to continue");
    Ok(())
}

/// Click logout on the home page.
///
/// # Errors
///
/// Returns error if the page reports a failure.
pub async fn logout(state: CliState) -> Result<(), CommandError> {
    if !state.session().is_logged_in() {
        info!("No active session");
        return Ok(());
    }

    let mut browser = CliBrowser::open(state, "/index.html").await;
    browser.dispatch(Event::Logout).await;
    outcome(browser.page())?;
    browser.settle().await;
    Ok(())
}

/// List the current user's orders.
///
/// # Errors
///
/// Returns error if nobody is logged in or the backend call fails.
pub async fn orders(state: &CliState) -> Result<(), CommandError> {
    let user = state
        .session()
        .get_current_user()
        .ok_or(CommandError::NotLoggedIn)?;

    let orders = state.api().get_orders(&user.username).await?;
    if orders.is_empty() {
        info!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        info!(
            id = %order.order_id,
            status = %order.status,
            date = %format_order_date(&order.created_at),
            total = %order.total_amount,
            address = %address_preview(&order.delivery_address),
            "Order #{}",
            order.order_number
        );
    }
    Ok(())
}
