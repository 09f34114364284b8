//! Application state shared across page controllers.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiClient, ApiResult, FoodApi};
use crate::config::ClientConfig;
use crate::session::{FileStore, KeyValueStore, SessionStore};

/// Services every page controller works with.
///
/// Cheaply cloneable via `Arc`. Generic over the backend and the storage
/// so tests can inject fakes.
pub struct AppState<A, K> {
    inner: Arc<AppStateInner<A, K>>,
}

struct AppStateInner<A, K> {
    api: A,
    session: SessionStore<K>,
    notification_duration: Duration,
}

impl<A, K> Clone for AppState<A, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, K> std::fmt::Debug for AppState<A, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("notification_duration", &self.inner.notification_duration)
            .finish_non_exhaustive()
    }
}

impl AppState<ApiClient, FileStore> {
    /// Build the production state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Ok(Self::new(
            ApiClient::new(config)?,
            FileStore::with_path(&config.storage_path),
            config.notification_duration,
        ))
    }
}

impl<A: FoodApi, K: KeyValueStore> AppState<A, K> {
    /// Create a new application state.
    pub fn new(api: A, storage: K, notification_duration: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                api,
                session: SessionStore::new(storage),
                notification_duration,
            }),
        }
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore<K> {
        &self.inner.session
    }

    /// Default time a notification stays visible.
    #[must_use]
    pub fn notification_duration(&self) -> Duration {
        self.inner.notification_duration
    }
}
