//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login redirects
//! and identity-dependent rendering.
//!
//! INVARIANTS
//! ==========
//! `loading` starts `true` and flips to `false` exactly once, either when the
//! mount-time token lookup settles or when the user logs out first. Nothing
//! sets it back.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use oidc::UserInfo;

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub user: Option<UserInfo>,
    pub loading: bool,
    /// Why the last token lookup fell through to signed-out, for diagnostics.
    pub last_error: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true, last_error: None }
    }
}

/// Tri-state view of [`AuthState`].
#[derive(Clone, Debug, PartialEq)]
pub enum SessionPhase {
    Loading,
    Unauthenticated,
    Authenticated(UserInfo),
}

impl AuthState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.user, self.loading) {
            (_, true) => SessionPhase::Loading,
            (None, false) => SessionPhase::Unauthenticated,
            (Some(user), false) => SessionPhase::Authenticated(user.clone()),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }

    /// Apply the outcome of the mount-time lookup. Ignored once loading is over.
    ///
    /// Returns `true` if the state changed.
    pub fn settle(&mut self, outcome: Result<Option<UserInfo>, String>) -> bool {
        if !self.loading {
            return false;
        }
        match outcome {
            Ok(user) => {
                self.user = user;
                self.last_error = None;
            }
            Err(reason) => {
                self.user = None;
                self.last_error = Some(reason);
            }
        }
        self.loading = false;
        true
    }

    /// Drop the user immediately; the state is signed-out with no loading delay.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.loading = false;
    }
}
