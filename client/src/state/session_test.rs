use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::executor::block_on;
use oidc::{Client, ProviderMetadata};
use url::Url;

use super::*;
use crate::net::storage::{SessionToken, StorageError};

// =========================================================================
// Fakes
// =========================================================================

#[derive(Clone, Default)]
struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl MemoryStorage {
    fn with_token(raw: &str) -> Self {
        let storage = Self::default();
        *storage.slot.borrow_mut() = Some(raw.to_owned());
        storage
    }

    fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl TokenStorage for MemoryStorage {
    fn read(&self) -> Option<SessionToken> {
        self.slot.borrow().clone().and_then(SessionToken::new)
    }

    fn write(&self, token: &SessionToken) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(token.as_str().to_owned());
        Ok(())
    }

    fn remove(&self) {
        self.events.borrow_mut().push("storage.remove");
        *self.slot.borrow_mut() = None;
    }
}

#[derive(Clone)]
struct ScriptedOidc {
    discovery: Result<ProviderMetadata, String>,
    userinfo: Result<serde_json::Value, u16>,
    discover_calls: Rc<Cell<u32>>,
    seen: Rc<RefCell<Vec<(String, String)>>>,
}

impl ScriptedOidc {
    fn succeeding(sub: &str) -> Self {
        Self {
            discovery: Ok(metadata()),
            userinfo: Ok(serde_json::json!({ "sub": sub, "email": "a@hamkke.app" })),
            discover_calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn failing_discovery() -> Self {
        Self { discovery: Err("connection refused".to_owned()), ..Self::succeeding("unused") }
    }

    fn rejecting_token() -> Self {
        Self { userinfo: Err(401), ..Self::succeeding("unused") }
    }
}

#[async_trait::async_trait(?Send)]
impl OidcClient for ScriptedOidc {
    async fn discover(&self, _issuer: &Url) -> Result<ProviderMetadata, SessionError> {
        self.discover_calls.set(self.discover_calls.get() + 1);
        self.discovery.clone().map_err(SessionError::Discovery)
    }

    async fn userinfo(&self, client: &Client, token: &SessionToken) -> Result<UserInfo, SessionError> {
        self.seen
            .borrow_mut()
            .push((client.client_id().to_owned(), token.as_str().to_owned()));
        match &self.userinfo {
            Ok(body) => Ok(serde_json::from_value(body.clone()).expect("scripted user info should decode")),
            Err(status) => Err(SessionError::Rejected { status: *status }),
        }
    }
}

/// Records every redirect along with what storage and auth looked like at
/// that moment.
#[derive(Clone, Default)]
struct RecordingNavigator {
    redirects: Rc<RefCell<Vec<String>>>,
    storage: Option<MemoryStorage>,
    auth: Rc<RefCell<Option<RwSignal<AuthState>>>>,
    observed: Rc<RefCell<Vec<(bool, bool)>>>,
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, target: &ExternalRedirect) {
        if let Some(storage) = &self.storage {
            storage.events.borrow_mut().push("navigator.redirect");
            let token_cleared = storage.raw().is_none();
            let user_cleared = self
                .auth
                .borrow()
                .map_or(true, |auth| auth.with_untracked(|a| a.user.is_none()));
            self.observed.borrow_mut().push((token_cleared, user_cleared));
        }
        self.redirects.borrow_mut().push(target.as_str().to_owned());
    }
}

fn metadata() -> ProviderMetadata {
    ProviderMetadata {
        issuer: "https://cognito-idp.us-east-1.amazonaws.com/pool".to_owned(),
        authorization_endpoint: "https://hamkke.auth/oauth2/authorize".to_owned(),
        token_endpoint: Some("https://hamkke.auth/oauth2/token".to_owned()),
        userinfo_endpoint: Some("https://hamkke.auth/oauth2/userInfo".to_owned()),
        jwks_uri: None,
        end_session_endpoint: None,
    }
}

fn config() -> AuthConfig {
    AuthConfig {
        issuer_origin: Url::parse("https://hamkke.auth.us-east-1.amazoncognito.com").unwrap(),
        client_id: "client-123".to_owned(),
        redirect_uri: Url::parse("https://hamkke.app/login").unwrap(),
        login_url: Url::parse("https://api.hamkke.app/dev/login").unwrap(),
        callback_url: Url::parse("https://hamkke.app/api/auth/callback").unwrap(),
    }
}

type TestStore = SessionStore<MemoryStorage, ScriptedOidc, RecordingNavigator>;

fn store(storage: MemoryStorage, oidc: ScriptedOidc) -> (TestStore, RecordingNavigator) {
    let navigator = RecordingNavigator { storage: Some(storage.clone()), ..RecordingNavigator::default() };
    let store = SessionStore::new(config(), storage, oidc, navigator.clone());
    *navigator.auth.borrow_mut() = Some(store.auth());
    (store, navigator)
}

// =========================================================================
// initialize
// =========================================================================

#[test]
fn starts_loading() {
    let (store, _) = store(MemoryStorage::default(), ScriptedOidc::succeeding("u1"));
    assert_eq!(store.phase(), SessionPhase::Loading);
    assert!(store.state().loading);
}

#[test]
fn no_token_settles_unauthenticated_without_network() {
    let oidc = ScriptedOidc::succeeding("u1");
    let calls = oidc.discover_calls.clone();
    let (store, _) = store(MemoryStorage::default(), oidc);

    block_on(store.initialize());

    assert_eq!(store.phase(), SessionPhase::Unauthenticated);
    assert!(!store.state().loading);
    assert_eq!(calls.get(), 0);
}

#[test]
fn resolved_token_settles_authenticated() {
    let oidc = ScriptedOidc::succeeding("u1");
    let seen = oidc.seen.clone();
    let (store, _) = store(MemoryStorage::with_token("tok-1"), oidc);

    block_on(store.initialize());

    let SessionPhase::Authenticated(user) = store.phase() else {
        panic!("expected authenticated, got {:?}", store.phase());
    };
    assert_eq!(user.subject, "u1");
    assert_eq!(user.email.as_deref(), Some("a@hamkke.app"));
    assert!(!store.state().loading);
    assert_eq!(seen.borrow().as_slice(), &[("client-123".to_owned(), "tok-1".to_owned())]);
}

#[test]
fn discovery_failure_falls_through_and_keeps_token() {
    let storage = MemoryStorage::with_token("tok-1");
    let (store, _) = store(storage.clone(), ScriptedOidc::failing_discovery());

    block_on(store.initialize());

    assert_eq!(store.phase(), SessionPhase::Unauthenticated);
    assert!(!store.state().loading);
    assert_eq!(storage.raw().as_deref(), Some("tok-1"));
    assert_eq!(store.state().last_error.as_deref(), Some("discovery failed: connection refused"));
}

#[test]
fn rejected_token_falls_through_and_keeps_token() {
    let storage = MemoryStorage::with_token("expired");
    let (store, _) = store(storage.clone(), ScriptedOidc::rejecting_token());

    block_on(store.initialize());

    assert_eq!(store.phase(), SessionPhase::Unauthenticated);
    assert_eq!(storage.raw().as_deref(), Some("expired"));
    assert!(store.state().last_error.unwrap().contains("401"));
}

#[test]
fn blank_stored_token_counts_as_absent() {
    let oidc = ScriptedOidc::succeeding("u1");
    let calls = oidc.discover_calls.clone();
    let (store, _) = store(MemoryStorage::with_token("   "), oidc);

    block_on(store.initialize());

    assert_eq!(store.phase(), SessionPhase::Unauthenticated);
    assert_eq!(calls.get(), 0);
}

#[test]
fn initialize_runs_once_and_loading_never_returns() {
    let oidc = ScriptedOidc::succeeding("u1");
    let calls = oidc.discover_calls.clone();
    let (store, _) = store(MemoryStorage::with_token("tok-1"), oidc);

    block_on(store.initialize());
    block_on(store.initialize());

    assert_eq!(calls.get(), 1);
    assert!(!store.state().loading);
    assert!(matches!(store.phase(), SessionPhase::Authenticated(_)));
}

#[test]
fn clones_share_one_initialization() {
    let oidc = ScriptedOidc::succeeding("u1");
    let calls = oidc.discover_calls.clone();
    let (store, _) = store(MemoryStorage::with_token("tok-1"), oidc);
    let twin = store.clone();

    block_on(store.initialize());
    block_on(twin.initialize());

    assert_eq!(calls.get(), 1);
    assert!(matches!(twin.phase(), SessionPhase::Authenticated(_)));
}

// =========================================================================
// login
// =========================================================================

#[test]
fn login_without_provider_targets_bare_login_url() {
    let (store, navigator) = store(MemoryStorage::default(), ScriptedOidc::succeeding("u1"));
    store.login(None);
    assert_eq!(navigator.redirects.borrow().as_slice(), &["https://api.hamkke.app/dev/login".to_owned()]);
}

#[test]
fn login_with_apple_appends_provider() {
    let (store, navigator) = store(MemoryStorage::default(), ScriptedOidc::succeeding("u1"));
    store.login(Some(IdentityProvider::Apple));
    assert_eq!(
        navigator.redirects.borrow().as_slice(),
        &["https://api.hamkke.app/dev/login?provider=Apple".to_owned()]
    );
}

#[test]
fn login_with_google_appends_provider() {
    let redirect = login_redirect(&config(), Some(IdentityProvider::Google));
    assert_eq!(redirect.as_str(), "https://api.hamkke.app/dev/login?provider=Google");
}

// =========================================================================
// logout
// =========================================================================

#[test]
fn logout_clears_token_and_user_before_redirect() {
    let storage = MemoryStorage::with_token("tok-1");
    let (store, navigator) = store(storage.clone(), ScriptedOidc::succeeding("u1"));
    block_on(store.initialize());
    assert!(matches!(store.phase(), SessionPhase::Authenticated(_)));

    store.logout();

    assert_eq!(store.phase(), SessionPhase::Unauthenticated);
    assert!(storage.raw().is_none());
    assert_eq!(storage.events.borrow().as_slice(), &["storage.remove", "navigator.redirect"]);
    assert_eq!(navigator.observed.borrow().as_slice(), &[(true, true)]);

    let redirects = navigator.redirects.borrow();
    let url = Url::parse(&redirects[0]).unwrap();
    assert_eq!(url.host_str(), Some("hamkke.auth.us-east-1.amazoncognito.com"));
    assert_eq!(url.path(), "/logout");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("client_id".to_owned(), "client-123".to_owned())));
    assert!(pairs.contains(&("logout_uri".to_owned(), "https://hamkke.app/login".to_owned())));
}

#[test]
fn logout_while_loading_wins_over_late_resolution() {
    let (store, _) = store(MemoryStorage::with_token("tok-1"), ScriptedOidc::succeeding("u1"));

    store.logout();
    assert_eq!(store.phase(), SessionPhase::Unauthenticated);

    block_on(store.initialize());
    assert_eq!(store.phase(), SessionPhase::Unauthenticated);
}
