//! Auth routes: the browser-facing half of the authorization-code flow.
//!
//! `GET /api/auth/login` sends the browser to the provider with a fresh
//! `state` bound to a short-lived cookie. `GET /api/auth/callback` checks that
//! state, trades the code, and returns the tokens as JSON for the client to
//! store.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use oidc::IdentityProvider;
use serde::Deserialize;
use time::Duration;

use crate::services::gateway;
use crate::state::AppState;

pub(crate) const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

fn state_cookie(value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

#[derive(Deserialize)]
pub struct LoginQuery {
    provider: Option<String>,
}

/// `GET /api/auth/login[?provider=Google|Apple]`: 302 to the provider's
/// authorization endpoint.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Query(params): Query<LoginQuery>) -> Response {
    let provider = match params
        .provider
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(str::parse::<IdentityProvider>)
        .transpose()
    {
        Ok(provider) => provider,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let oauth_state = gateway::generate_state();
    let url = match state
        .provider
        .authorize_url(state.config.redirect_uri.as_str(), &oauth_state, provider)
    {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "authorize url build failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login redirect failed").into_response();
        }
    };

    tracing::debug!(provider = ?provider, "redirecting to identity provider");
    let jar = jar.add(state_cookie(oauth_state, state.config.cookie_secure, Duration::minutes(10)));
    (StatusCode::FOUND, jar, [(header::LOCATION, url.to_string())]).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

/// `GET /api/auth/callback?code=..&state=..`: exchange the code and return
/// the access token, refresh token, and decoded claims.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code").into_response();
    };

    // Verify OAuth CSRF state from cookie.
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(Cookie::value)
        .unwrap_or_default();
    let callback_state = params.state.as_deref().unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        tracing::warn!("oauth state mismatch on callback");
        return (StatusCode::UNAUTHORIZED, "invalid oauth state").into_response();
    }

    let tokens = match gateway::exchange_code(
        &state.http,
        &state.provider,
        &state.config.client_secret,
        &state.config.redirect_uri,
        code,
    )
    .await
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Token exchange failed").into_response();
        }
    };

    let payload = match gateway::callback_tokens(tokens) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "access token is not a JWT");
            return (StatusCode::INTERNAL_SERVER_ERROR, "JWT parse failed").into_response();
        }
    };

    let body = match serde_json::to_string_pretty(&payload) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "callback payload serialization failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Token exchange failed").into_response();
        }
    };

    let jar = jar.add(state_cookie(String::new(), state.config.cookie_secure, Duration::ZERO));
    (jar, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
