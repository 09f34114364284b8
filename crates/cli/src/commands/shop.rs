//! Menu, cart and checkout.

use tracing::{info, warn};

use food_delivery_client::FoodApi;
use food_delivery_client::routes::{Event, checkout, menu};
use food_delivery_core::MenuItemId;

use super::{CliBrowser, CliState, CommandError, outcome};

/// Open the menu page, apply the filter and search, and list what remains.
///
/// # Errors
///
/// Returns `CommandError::Rejected` if the menu could not be loaded.
pub async fn menu(
    state: CliState,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<(), CommandError> {
    let mut browser = CliBrowser::open(state, "/menu.html").await;

    let menu_html = browser
        .page()
        .by_id(menu::MENU_CONTAINER)
        .map(|el| el.inner().to_owned())
        .unwrap_or_default();
    if menu_html.contains("Failed to load menu") {
        return Err(CommandError::Rejected("Failed to load menu".to_owned()));
    }

    if let Some(category) = category {
        browser.dispatch(Event::Filter(category.to_owned())).await;
    }
    if let Some(query) = search {
        browser.dispatch(Event::Search(query.to_owned())).await;
    }

    let items = menu::visible_items(browser.page());
    if items.is_empty() {
        info!("No menu items available");
        return Ok(());
    }

    for item in items {
        info!(
            id = %item.id,
            price = %item.price,
            category = %item.category,
            vegetarian = item.vegetarian,
            food_type = %item.factory_type,
            "{}",
            item.name
        );
    }
    Ok(())
}

/// Add one unit of `item_id` through the menu page's add-to-cart control.
///
/// # Errors
///
/// Returns error if the item does not exist or the page reports a failure
/// (including "login first").
pub async fn add(state: CliState, item_id: MenuItemId) -> Result<(), CommandError> {
    let item = state.api().get_menu_item(item_id).await?;
    if !item.available {
        warn!(id = %item_id, "Item is marked unavailable");
    }

    let mut browser = CliBrowser::open(state, "/menu.html").await;
    browser
        .dispatch(Event::AddToCart {
            item_id,
            food_type: item.factory_type,
            item_name: item.name,
        })
        .await;
    outcome(browser.page())
}

/// Show the server-computed cart.
///
/// # Errors
///
/// Returns error if nobody is logged in or the backend call fails.
pub async fn cart(state: &CliState) -> Result<(), CommandError> {
    let session = state.session();
    let session_id = session
        .get_session_id()
        .filter(|_| session.is_logged_in())
        .ok_or(CommandError::NotLoggedIn)?;

    let cart = state.api().get_cart(&session_id).await?;
    if cart.is_empty() {
        info!("Your cart is empty");
        return Ok(());
    }

    for line in &cart.items {
        info!(
            quantity = line.quantity.get(),
            each = %line.price,
            total = %line.total,
            "{}",
            line.name
        );
    }
    info!(
        subtotal = %cart.subtotal,
        delivery_fee = %cart.delivery_fee,
        tax = %cart.tax,
        total = %cart.total,
        "Cart total"
    );
    Ok(())
}

/// Fill and submit the checkout form, then follow the redirect to the
/// profile page.
///
/// # Errors
///
/// Returns error if nobody is logged in or the order is not placed.
pub async fn checkout(
    state: CliState,
    address: &str,
    phone: Option<&str>,
    payment: Option<&str>,
) -> Result<(), CommandError> {
    let mut browser = CliBrowser::open(state, "/checkout.html").await;
    if !browser.page().has(checkout::CHECKOUT_FORM) {
        return Err(CommandError::NotLoggedIn);
    }

    browser.fill("address", address);
    browser.fill("phone", phone.unwrap_or_default());
    browser.fill("paymentMethod", payment.unwrap_or_default());
    browser
        .dispatch(Event::SubmitForm(checkout::CHECKOUT_FORM.to_owned()))
        .await;
    outcome(browser.page())?;

    browser.settle().await;
    info!(landing = %browser.page().location(), "Order placed");
    Ok(())
}
