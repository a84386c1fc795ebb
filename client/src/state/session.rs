//! Session store: owns [`AuthState`] and the login/logout handshake.
//!
//! SYSTEM CONTEXT
//! ==============
//! One store is created per page load in `App` and shared through Leptos
//! context. Its dependencies (token slot, provider client, navigator) are
//! injected so tests can drive every branch without a browser.
//!
//! FAILURE POLICY
//! ==============
//! A stored token that cannot be resolved (network error, rejected token,
//! bad discovery document) is logged and collapses to signed-out. The token
//! itself is left in storage; only `logout` deletes it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use oidc::{IdentityProvider, UserInfo};

use crate::config::AuthConfig;
use crate::net::identity::{HttpOidcClient, OidcClient};
use crate::net::storage::{LocalStorage, TokenStorage};
use crate::state::auth::{AuthState, SessionPhase};
use crate::util::navigation::{BrowserNavigator, ExternalRedirect, Navigator};

/// Why a stored token did not resolve to a user.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("discovery failed: {0}")]
    Discovery(String),
    #[error("user info request failed: {0}")]
    UserInfo(String),
    #[error("identity provider rejected the token (status {status})")]
    Rejected { status: u16 },
    #[error(transparent)]
    Oidc(#[from] oidc::OidcError),
    #[error("not available on server")]
    Unavailable,
}

/// Store wired to the real browser services.
pub type BrowserSessionStore = SessionStore<LocalStorage, HttpOidcClient, BrowserNavigator>;

#[derive(Clone)]
pub struct SessionStore<S, C, N> {
    config: Arc<AuthConfig>,
    storage: S,
    oidc: C,
    navigator: N,
    auth: RwSignal<AuthState>,
    started: Arc<AtomicBool>,
}

impl BrowserSessionStore {
    #[must_use]
    pub fn browser(config: AuthConfig) -> Self {
        Self::new(config, LocalStorage::default(), HttpOidcClient, BrowserNavigator)
    }
}

impl<S, C, N> SessionStore<S, C, N>
where
    S: TokenStorage,
    C: OidcClient,
    N: Navigator,
{
    #[must_use]
    pub fn new(config: AuthConfig, storage: S, oidc: C, navigator: N) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            oidc,
            navigator,
            auth: RwSignal::new(AuthState::default()),
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reactive handle for components that render from auth state.
    #[must_use]
    pub fn auth(&self) -> RwSignal<AuthState> {
        self.auth
    }

    /// Current snapshot, read without subscribing.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.auth.get_untracked()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.auth.with_untracked(AuthState::phase)
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Resolve the stored token into a user. Runs at most once per store;
    /// later calls return immediately.
    pub async fn initialize(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let outcome = match self.resolve_user().await {
            Ok(user) => {
                log::debug!("session resolved: authenticated={}", user.is_some());
                Ok(user)
            }
            Err(err) => {
                log::error!("auth error: {err}");
                Err(err.to_string())
            }
        };
        self.auth.update(|state| {
            state.settle(outcome);
        });
    }

    async fn resolve_user(&self) -> Result<Option<UserInfo>, SessionError> {
        let Some(token) = self.storage.read() else {
            return Ok(None);
        };
        let metadata = self.oidc.discover(&self.config.issuer_origin).await?;
        let client = oidc::Client::new(metadata, self.config.client_id.clone());
        let user = self.oidc.userinfo(&client, &token).await?;
        Ok(Some(user))
    }

    /// Leave for the gateway login endpoint, optionally pinned to a provider.
    pub fn login(&self, provider: Option<IdentityProvider>) {
        self.navigator.redirect(&login_redirect(&self.config, provider));
    }

    /// Forget the local session, then leave for the provider's sign-out page.
    pub fn logout(&self) {
        self.storage.remove();
        self.auth.update(AuthState::sign_out);

        match logout_redirect(&self.config) {
            Ok(target) => self.navigator.redirect(&target),
            Err(err) => log::error!("logout redirect failed: {err}"),
        }
    }
}

/// Gateway login URL, with `provider` only when one was chosen.
#[must_use]
pub fn login_redirect(config: &AuthConfig, provider: Option<IdentityProvider>) -> ExternalRedirect {
    ExternalRedirect::new(oidc::login_url(&config.login_url, provider))
}

/// Provider sign-out URL carrying the client id and post-logout URI.
///
/// # Errors
///
/// Returns an error if the issuer origin cannot be joined with `/logout`.
pub fn logout_redirect(config: &AuthConfig) -> Result<ExternalRedirect, oidc::OidcError> {
    oidc::logout_url(&config.issuer_origin, &config.client_id, &config.redirect_uri).map(ExternalRedirect::new)
}
