//! Persisted session-token slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser keeps exactly one bearer token under a fixed `localStorage`
//! key. The session store reads it once on mount and deletes it on logout;
//! the callback page is the only writer.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::fmt;

/// `localStorage` key holding the bearer token.
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Opaque bearer credential. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token, rejecting empty or whitespace-only values.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("token storage unavailable")]
    Unavailable,
    #[error("token storage rejected write: {0}")]
    Rejected(String),
}

/// A single named slot holding the session token.
pub trait TokenStorage {
    /// Current token, or `None` when no session is stored.
    fn read(&self) -> Option<SessionToken>;

    /// Replace the stored token in one write.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable or refuses the write.
    fn write(&self, token: &SessionToken) -> Result<(), StorageError>;

    /// Delete the stored token. Missing tokens are not an error.
    fn remove(&self);
}

/// Browser `localStorage` slot. Server-side renders see an empty slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalStorage {
    key: &'static str,
}

impl LocalStorage {
    #[must_use]
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(TOKEN_STORAGE_KEY)
    }
}

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl TokenStorage for LocalStorage {
    fn read(&self) -> Option<SessionToken> {
        #[cfg(feature = "hydrate")]
        {
            let raw = local_storage()?.get_item(self.key).ok().flatten()?;
            SessionToken::new(raw)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    fn write(&self, token: &SessionToken) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            let storage = local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .set_item(self.key, token.as_str())
                .map_err(|e| StorageError::Rejected(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = token;
            Err(StorageError::Unavailable)
        }
    }

    fn remove(&self) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(self.key);
            }
        }
    }
}
