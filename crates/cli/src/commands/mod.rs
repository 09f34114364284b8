//! Subcommand implementations.
//!
//! Commands that change state go through the page controllers via a
//! [`Browser`], so the CLI sees the same notifications and redirects a user
//! would. Read-only listings call the API directly.

pub mod account;
pub mod page;
pub mod shop;

use thiserror::Error;
use tracing::{info, warn};

use food_delivery_client::api::ApiError;
use food_delivery_client::error::ClientError;
use food_delivery_client::page::{Document, NotificationKind};
use food_delivery_client::session::{FileStore, StorageError};
use food_delivery_client::{ApiClient, AppState, Browser, ClientConfig};

/// State the CLI runs against: the real backend and file-backed storage.
pub type CliState = AppState<ApiClient, FileStore>;

pub type CliBrowser = Browser<ApiClient, FileStore>;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The page reported failure through an error or warning notification.
    #[error("{0}")]
    Rejected(String),

    #[error("Not logged in. Run `fd-cli login` first.")]
    NotLoggedIn,

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        Self::Client(ClientError::Api(e))
    }
}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        Self::Client(ClientError::Storage(e))
    }
}

impl CommandError {
    /// Report client faults to Sentry.
    pub fn capture(&self) {
        if let Self::Client(e) = self {
            e.capture();
        }
    }
}

/// Build the production state.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built.
pub fn connect(config: &ClientConfig) -> Result<CliState, CommandError> {
    Ok(AppState::from_config(config)?)
}

/// Log the page's notifications, failing on the most recent one if it is
/// an error or a warning.
///
/// # Errors
///
/// Returns `CommandError::Rejected` with the notification text.
pub fn outcome(doc: &Document) -> Result<(), CommandError> {
    for el in doc.notifications() {
        if let Some(message) = el.attr("data-message") {
            info!(classes = ?el.classes(), "{message}");
        }
    }

    match doc.last_notification() {
        Some((NotificationKind::Error | NotificationKind::Warning, message)) => {
            Err(CommandError::Rejected(message.to_owned()))
        }
        Some(_) => Ok(()),
        None => {
            warn!("Page did not report an outcome");
            Ok(())
        }
    }
}
