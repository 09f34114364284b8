//! Session persistence.
//!
//! The session is two storage records: `sessionId` (opaque string) and
//! `currentUser` (JSON). Both are written on login, read on every page
//! load, and removed together on logout.

mod storage;

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};

use tracing::{instrument, warn};

use crate::api::types::User;

/// Storage key for the backend session id.
pub const SESSION_ID_KEY: &str = "sessionId";

/// Storage key for the cached user record.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Typed view over a [`KeyValueStore`].
///
/// Reads never fail: unreadable or malformed records are logged and
/// treated as absent, which means "logged out".
#[derive(Debug)]
pub struct SessionStore<K> {
    storage: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub const fn new(storage: K) -> Self {
        Self { storage }
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &K {
        &self.storage
    }

    pub fn get_session_id(&self) -> Option<String> {
        self.read(SESSION_ID_KEY)
    }

    /// # Errors
    ///
    /// Returns error if the storage write fails.
    pub fn set_session_id(&self, session_id: &str) -> StorageResult<()> {
        self.storage.set(SESSION_ID_KEY, session_id)
    }

    /// The cached user, or `None` if absent or not valid JSON.
    pub fn get_current_user(&self) -> Option<User> {
        let raw = self.read(CURRENT_USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed currentUser record");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns error if serialization or the storage write fails.
    pub fn set_current_user(&self, user: &User) -> StorageResult<()> {
        let json = serde_json::to_string(user)?;
        self.storage.set(CURRENT_USER_KEY, &json)
    }

    /// Store the session id and the user together, in one write.
    ///
    /// On failure neither record changes.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the storage write fails.
    pub fn set_session(&self, session_id: &str, user: &User) -> StorageResult<()> {
        let json = serde_json::to_string(user)?;
        self.storage
            .set_all(&[(SESSION_ID_KEY, session_id), (CURRENT_USER_KEY, &json)])
    }

    /// Remove both session records in one write.
    ///
    /// # Errors
    ///
    /// Returns error if the storage write fails.
    #[instrument(skip(self))]
    pub fn clear_session(&self) -> StorageResult<()> {
        self.storage.remove_all(&[SESSION_ID_KEY, CURRENT_USER_KEY])
    }

    /// Logged in iff a user is cached and the session id is non-empty.
    pub fn is_logged_in(&self) -> bool {
        self.get_current_user().is_some()
            && self.get_session_id().is_some_and(|id| !id.is_empty())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read local storage");
                None
            }
        }
    }
}
