//! REST helpers for the auth gateway.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): stubs returning an error since the callback exchange is
//! only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result` outputs instead of panics so a failed exchange degrades
//! to an on-page message rather than a crashed hydration.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use oidc::CallbackTokens;

/// Append the callback query to the gateway endpoint.
#[cfg(any(test, feature = "hydrate"))]
fn callback_request_url(endpoint: &str, code: &str, state: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("code", code);
    if let Some(state) = state {
        query.append_pair("state", state);
    }
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}{}", query.finish())
}

#[cfg(any(test, feature = "hydrate"))]
fn exchange_failed_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("code exchange failed: {status}")
    } else {
        format!("code exchange failed: {status} {body}")
    }
}

/// Trade an authorization code for tokens at the gateway callback endpoint.
///
/// # Errors
///
/// Returns an error string if the HTTP request fails, the gateway responds
/// with a non-OK status, or the body is not a token payload.
pub async fn exchange_callback_code(
    endpoint: &str,
    code: &str,
    state: Option<&str>,
) -> Result<CallbackTokens, String> {
    #[cfg(feature = "hydrate")]
    {
        let url = callback_request_url(endpoint, code, state);
        let resp = gloo_net::http::Request::get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(exchange_failed_message(status, &body));
        }
        resp.json::<CallbackTokens>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (endpoint, code, state);
        Err("not available on server".to_owned())
    }
}
