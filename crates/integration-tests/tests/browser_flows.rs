//! Full page flows: `Browser` + `ApiClient` against the fake backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use food_delivery_client::api::ApiClient;
use food_delivery_client::page::NotificationKind;
use food_delivery_client::routes::{Event, account, auth, cart, checkout, chrome, menu};
use food_delivery_client::session::MemoryStore;
use food_delivery_client::{AppState, Browser, ClientConfig};
use food_delivery_core::MenuItemId;
use food_delivery_integration_tests::{FakeBackend, PASSWORD, offline_base_url, state_for};

type TestBrowser = Browser<ApiClient, MemoryStore>;

async fn logged_in(state: AppState<ApiClient, MemoryStore>, username: &str) -> TestBrowser {
    let mut browser = Browser::open(state, "/login.html").await;
    browser.fill("username", username);
    browser.fill("password", PASSWORD);
    browser
        .dispatch(Event::SubmitForm(auth::LOGIN_FORM.to_string()))
        .await;
    browser.settle().await;
    browser
}

fn add_event(id: i32, food_type: &str, name: &str) -> Event {
    Event::AddToCart {
        item_id: MenuItemId::new(id),
        food_type: food_type.to_string(),
        item_name: name.to_string(),
    }
}

fn section(browser: &TestBrowser, id: &str) -> String {
    browser.page().by_id(id).unwrap().inner().to_owned()
}

#[tokio::test]
async fn test_admin_lands_on_dashboard_after_delay() {
    let backend = FakeBackend::start().await.unwrap();
    let mut browser = Browser::open(backend.state().unwrap(), "/login.html").await;
    browser.fill("username", "alice");
    browser.fill("password", PASSWORD);

    browser
        .dispatch(Event::SubmitForm(auth::LOGIN_FORM.to_string()))
        .await;
    assert_eq!(
        browser.page().last_notification(),
        Some((NotificationKind::Success, "Login successful!"))
    );
    assert_eq!(
        browser.state().session().get_current_user().unwrap().username,
        "alice"
    );

    browser.advance(Duration::from_millis(1000)).await;
    assert_eq!(browser.page().location().path(), "/login.html");

    browser.advance(Duration::from_millis(500)).await;
    assert_eq!(browser.page().location().path(), "/admin/dashboard.html");

    let user_display = browser.page().by_class(chrome::USER_DISPLAY).next().unwrap();
    assert_eq!(user_display.inner(), "alice");
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() {
    let backend = FakeBackend::start().await.unwrap();
    let mut browser = Browser::open(backend.state().unwrap(), "/login.html").await;
    browser.fill("username", "bob");
    browser.fill("password", "nope");

    browser
        .dispatch(Event::SubmitForm(auth::LOGIN_FORM.to_string()))
        .await;
    browser.settle().await;

    assert_eq!(browser.page().location().path(), "/login.html");
    assert!(!browser.state().session().is_logged_in());
}

#[tokio::test]
async fn test_order_from_menu_to_profile() {
    let backend = FakeBackend::start().await.unwrap();
    let mut browser = logged_in(backend.state().unwrap(), "bob").await;
    assert_eq!(browser.page().location().path(), "/menu.html");
    assert_eq!(
        section(&browser, menu::MENU_CONTAINER)
            .matches("class=\"menu-card\"")
            .count(),
        4
    );

    browser.dispatch(add_event(1, "PIZZA", "Margherita")).await;
    browser.dispatch(add_event(3, "BURGER", "Cheeseburger")).await;
    assert_eq!(
        browser.page().last_notification(),
        Some((NotificationKind::Success, "Cheeseburger added to cart!"))
    );
    let badge = browser.page().by_class(chrome::CART_COUNT).next().unwrap();
    assert_eq!(badge.inner(), "2");
    assert!(!badge.is_hidden());

    browser.navigate("/cart.html").await;
    let lines = section(&browser, cart::CART_CONTAINER);
    assert_eq!(lines.matches("class=\"cart-item\"").count(), 2);
    let summary = section(&browser, cart::CART_SUMMARY);
    for amount in ["$22.49", "$2.99", "$1.79", "$27.27"] {
        assert!(summary.contains(amount), "summary missing {amount}");
    }

    browser.dispatch(Event::Checkout).await;
    assert_eq!(browser.page().location().path(), "/checkout.html");
    assert!(section(&browser, checkout::CHECKOUT_SUMMARY).contains("$27.27"));

    browser.fill("address", "221B Baker Street, Marylebone, London NW1 6XE, United Kingdom");
    browser.fill("paymentMethod", "CASH");
    browser
        .dispatch(Event::SubmitForm(checkout::CHECKOUT_FORM.to_string()))
        .await;
    assert_eq!(
        browser.page().last_notification(),
        Some((NotificationKind::Success, "Order placed successfully"))
    );

    browser.advance(Duration::from_millis(2000)).await;
    assert_eq!(browser.page().location().path(), "/profile.html");
    assert_eq!(backend.open_carts(), 0);

    let profile = section(&browser, account::PROFILE_INFO);
    assert!(profile.contains("bob@food.test"));
    assert!(profile.contains("Not set"));

    let history = section(&browser, account::ORDER_HISTORY);
    assert!(history.contains("Order #ORD-00000001"));
    assert!(history.contains("3/5/2024"));
    assert!(history.contains("$27.27"));
    assert!(history.contains("221B Baker Street, Marylebone, London NW1 6XE, Uni..."));
}

#[tokio::test]
async fn test_logged_out_add_to_cart_goes_to_login() {
    let backend = FakeBackend::start().await.unwrap();
    let mut browser = Browser::open(backend.state().unwrap(), "/menu.html").await;

    browser.dispatch(add_event(2, "PIZZA", "Pepperoni")).await;
    assert_eq!(
        browser.page().last_notification(),
        Some((
            NotificationKind::Warning,
            "Please login first to add items to cart"
        ))
    );

    browser.settle().await;
    assert_eq!(browser.page().location().path(), "/login.html");
    assert_eq!(
        browser.page().location().query_param("redirect"),
        Some("menu.html")
    );
    assert_eq!(backend.open_carts(), 0);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let backend = FakeBackend::start().await.unwrap();
    let mut browser = logged_in(backend.state().unwrap(), "bob").await;
    assert!(browser.state().session().is_logged_in());

    browser.dispatch(Event::Logout).await;
    assert!(!browser.state().session().is_logged_in());

    browser.advance(Duration::from_millis(1000)).await;
    assert_eq!(browser.page().location().path(), "/index.html");
    assert!(
        browser
            .page()
            .by_class(chrome::CART_COUNT)
            .next()
            .unwrap()
            .is_hidden()
    );
}

#[tokio::test]
async fn test_register_then_login() {
    let backend = FakeBackend::start().await.unwrap();
    let mut browser = Browser::open(backend.state().unwrap(), "/register.html").await;
    for (field, value) in [
        ("username", "dave"),
        ("password", PASSWORD),
        ("email", "dave@food.test"),
        ("fullName", "Dave Diner"),
        ("phone", ""),
    ] {
        assert!(browser.fill(field, value));
    }

    browser
        .dispatch(Event::SubmitForm(auth::REGISTER_FORM.to_string()))
        .await;
    assert_eq!(
        browser.page().last_notification().map(|(kind, _)| kind),
        Some(NotificationKind::Success)
    );
    browser.settle().await;
    assert_eq!(browser.page().location().path(), "/login.html");

    let browser = logged_in(browser.state().clone(), "dave").await;
    assert_eq!(browser.page().location().path(), "/menu.html");
}

#[tokio::test]
async fn test_offline_backend() {
    let config = ClientConfig {
        api_base_url: offline_base_url().await.unwrap(),
        ..ClientConfig::default()
    };

    let browser = Browser::open(state_for(&config).unwrap(), "/menu.html").await;
    assert_eq!(
        browser.page().last_notification(),
        Some((
            NotificationKind::Error,
            "Backend server is not running. Please start the server."
        ))
    );
    assert!(section(&browser, menu::MENU_CONTAINER).contains("Failed to load menu"));
    assert!(section(&browser, chrome::API_STATUS).contains("disconnected"));

    let login = Browser::open(state_for(&config).unwrap(), "/login.html").await;
    assert_eq!(login.page().notifications().count(), 0);
}
