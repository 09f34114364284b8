//! Page rendering and backend health.

use std::io::Write;

use tracing::info;

use food_delivery_client::FoodApi;

use super::{CliBrowser, CliState, CommandError};

/// Load `path`, optionally run its timers, and print the final page.
///
/// # Errors
///
/// Returns error if stdout cannot be written.
pub async fn open(state: CliState, path: &str, settle: bool) -> Result<(), CommandError> {
    let mut browser = CliBrowser::open(state, path).await;
    if settle {
        browser.settle().await;
    }

    info!(
        location = %browser.page().location(),
        loads = browser.history().len(),
        "Page loaded"
    );

    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", browser.page().render_html())?;
    Ok(())
}

/// Probe `GET /test` and log what the backend reports.
///
/// # Errors
///
/// Returns error if the backend is unreachable.
pub async fn status(state: &CliState) -> Result<(), CommandError> {
    let health = state.api().test_connection().await?;

    info!(
        status = health.status.as_deref().unwrap_or("unknown"),
        service = health.service.as_deref().unwrap_or("-"),
        version = health.version.as_deref().unwrap_or("-"),
        database = health
            .database_status
            .as_deref()
            .or(health.database.as_deref())
            .unwrap_or("-"),
        "Backend online"
    );
    if let (Some(users), Some(items)) = (health.user_count, health.menu_item_count) {
        info!(users, menu_items = items, orders = health.order_count, "Backend data");
    }
    Ok(())
}
