//! Unified error handling with Sentry integration.
//!
//! Page controllers never surface errors to the caller; they turn them
//! into notifications or error states. [`ClientError`] covers the setup
//! paths (configuration, storage, HTTP client construction) and is what
//! front ends like the CLI propagate.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::StorageError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Report the error to Sentry when it indicates a client-side fault.
    ///
    /// Backend rejections (`4xx`/`5xx` with a response) are not reported.
    pub fn capture(&self) {
        let reportable = match self {
            Self::Api(ApiError::Http { .. }) => false,
            Self::Api(_) | Self::Config(_) | Self::Storage(_) => true,
        };

        if reportable {
            let event_id = sentry::capture_error(self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Client error");
        } else {
            tracing::warn!(error = %self, "Backend rejected request");
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(username: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_owned()),
            email: email.filter(|e| !e.is_empty()).map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("item_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::from(ApiError::from_status(404, serde_json::json!({})));
        assert_eq!(err.to_string(), "API error: HTTP 404");

        let err = ClientError::from(ConfigError::InvalidEnvVar(
            "FOOD_NOTIFICATION_MS".to_string(),
            "invalid digit found in string".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid environment variable FOOD_NOTIFICATION_MS: invalid digit found in string"
        );
    }

    #[test]
    fn test_capture_without_sentry_client_is_noop() {
        ClientError::from(ApiError::from_status(500, serde_json::json!({}))).capture();
        ClientError::from(StorageError::Io(std::io::Error::other("disk full"))).capture();
        set_sentry_user("alice", Some("alice@food.test"));
        add_breadcrumb("auth", "Logged in", Some(&[("username", "alice")]));
        clear_sentry_user();
    }
}
