use std::cell::RefCell;
use std::collections::HashMap;

use super::*;

#[derive(Default)]
struct RecordingStorage {
    writes: RefCell<Vec<String>>,
    reject: bool,
}

impl TokenStorage for RecordingStorage {
    fn read(&self) -> Option<SessionToken> {
        self.writes.borrow().last().cloned().and_then(SessionToken::new)
    }

    fn write(&self, token: &SessionToken) -> Result<(), StorageError> {
        if self.reject {
            return Err(StorageError::Rejected("QuotaExceededError".to_owned()));
        }
        self.writes.borrow_mut().push(token.as_str().to_owned());
        Ok(())
    }

    fn remove(&self) {
        self.writes.borrow_mut().clear();
    }
}

fn params_from(pairs: &[(&str, &str)]) -> Result<CallbackParams, CallbackError> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    callback_params(|key| map.get(key).cloned())
}

fn tokens(access_token: &str) -> CallbackTokens {
    CallbackTokens { access_token: access_token.to_owned(), refresh_token: None, jwt_claims: serde_json::Map::new() }
}

// =========================================================================
// callback_params
// =========================================================================

#[test]
fn callback_params_reads_code_and_state() {
    assert_eq!(
        params_from(&[("code", "abc"), ("state", "s1")]),
        Ok(CallbackParams { code: "abc".to_owned(), state: Some("s1".to_owned()) })
    );
}

#[test]
fn callback_params_requires_code() {
    assert_eq!(params_from(&[("state", "s1")]), Err(CallbackError::MissingCode));
    assert_eq!(params_from(&[("code", "  ")]), Err(CallbackError::MissingCode));
}

#[test]
fn callback_params_surfaces_provider_error_description() {
    assert_eq!(
        params_from(&[("error", "access_denied"), ("error_description", "User cancelled")]),
        Err(CallbackError::Provider("User cancelled".to_owned()))
    );
    assert_eq!(
        params_from(&[("error", "access_denied"), ("code", "abc")]),
        Err(CallbackError::Provider("access_denied".to_owned()))
    );
}

// =========================================================================
// store_callback_tokens / complete_sign_in
// =========================================================================

#[test]
fn store_callback_tokens_writes_access_token_once() {
    let storage = RecordingStorage::default();
    let token = store_callback_tokens(&storage, tokens("tok-1")).unwrap();
    assert_eq!(token.as_str(), "tok-1");
    assert_eq!(storage.writes.borrow().as_slice(), &["tok-1".to_owned()]);
}

#[test]
fn store_callback_tokens_rejects_empty_token_without_writing() {
    let storage = RecordingStorage::default();
    assert_eq!(store_callback_tokens(&storage, tokens("")), Err(CallbackError::EmptyToken));
    assert!(storage.writes.borrow().is_empty());
}

#[test]
fn store_callback_tokens_reports_storage_failure() {
    let storage = RecordingStorage { reject: true, ..RecordingStorage::default() };
    assert!(matches!(
        store_callback_tokens(&storage, tokens("tok-1")),
        Err(CallbackError::Storage(StorageError::Rejected(_)))
    ));
    assert!(storage.read().is_none());
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn complete_sign_in_failed_exchange_leaves_storage_untouched() {
    let storage = RecordingStorage::default();
    let params = CallbackParams { code: "abc".to_owned(), state: None };
    let result = futures::executor::block_on(complete_sign_in(&storage, "/api/auth/callback", &params));
    assert_eq!(result, Err(CallbackError::Exchange("not available on server".to_owned())));
    assert!(storage.writes.borrow().is_empty());
}
