//! Provider callback: finish sign-in and hand the token to the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The identity provider redirects here with `?code=..&state=..`. The page
//! trades the code at the gateway, stores the access token, and reloads `/`
//! so the next page load's session store picks the token up.
//!
//! ERROR HANDLING
//! ==============
//! The token slot is written once, and only with a non-empty access token.
//! Any earlier failure leaves storage untouched and is shown on the page.

#[cfg(test)]
#[path = "callback_test.rs"]
mod callback_test;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use oidc::CallbackTokens;

use crate::net::storage::{SessionToken, StorageError, TokenStorage};
use crate::state::session::BrowserSessionStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    #[error("sign-in was not completed: {0}")]
    Provider(String),
    #[error("missing authorization code")]
    MissingCode,
    #[error("{0}")]
    Exchange(String),
    #[error("sign-in returned an empty access token")]
    EmptyToken,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Query parameters the provider appends to the callback route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: Option<String>,
}

/// Read callback parameters through `get`, surfacing provider-reported errors.
///
/// # Errors
///
/// Returns [`CallbackError::Provider`] when the provider sent `error`, and
/// [`CallbackError::MissingCode`] when no code is present.
pub fn callback_params<F>(get: F) -> Result<CallbackParams, CallbackError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(error) = get("error") {
        let detail = get("error_description").filter(|d| !d.trim().is_empty());
        return Err(CallbackError::Provider(detail.unwrap_or(error)));
    }
    let code = get("code")
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
        .ok_or(CallbackError::MissingCode)?;
    let state = get("state").filter(|s| !s.is_empty());
    Ok(CallbackParams { code, state })
}

/// Write the access token from a gateway response in a single step.
///
/// # Errors
///
/// Returns [`CallbackError::EmptyToken`] without touching storage when the
/// token is blank, or the storage error if the write fails.
pub fn store_callback_tokens<S: TokenStorage>(
    storage: &S,
    tokens: CallbackTokens,
) -> Result<SessionToken, CallbackError> {
    let token = SessionToken::new(tokens.access_token).ok_or(CallbackError::EmptyToken)?;
    storage.write(&token)?;
    Ok(token)
}

/// Exchange the code at `endpoint` and persist the resulting token.
///
/// # Errors
///
/// Returns the first failure; storage is only written on full success.
pub async fn complete_sign_in<S: TokenStorage>(
    storage: &S,
    endpoint: &str,
    params: &CallbackParams,
) -> Result<SessionToken, CallbackError> {
    let tokens = crate::net::api::exchange_callback_code(endpoint, &params.code, params.state.as_deref())
        .await
        .map_err(CallbackError::Exchange)?;
    store_callback_tokens(storage, tokens)
}

#[component]
pub fn CallbackPage() -> impl IntoView {
    let session = expect_context::<BrowserSessionStore>();
    let query = use_query_map();
    let failure = RwSignal::new(None::<String>);

    let params = query.with_untracked(|q| callback_params(|key| q.get(key)));
    match params {
        Ok(params) => {
            #[cfg(feature = "hydrate")]
            {
                let endpoint = session.config().callback_url.to_string();
                leptos::task::spawn_local(async move {
                    let storage = crate::net::storage::LocalStorage::default();
                    match complete_sign_in(&storage, &endpoint, &params).await {
                        Ok(_) => crate::util::navigation::assign_location(crate::util::auth::HOME_ROUTE),
                        Err(e) => {
                            log::error!("sign-in callback failed: {e}");
                            failure.set(Some(e.to_string()));
                        }
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&session, params);
            }
        }
        Err(e) => failure.set(Some(e.to_string())),
    }

    view! {
        <div class="landing landing--loading">
            <Show
                when=move || failure.get().is_some()
                fallback=|| view! { <div class="landing__status">"Completing sign-in..."</div> }
            >
                <div class="landing__status landing__status--error">
                    <p>{move || failure.get().unwrap_or_default()}</p>
                    <a href="/login">"Back to sign in"</a>
                </div>
            </Show>
        </div>
    }
}
