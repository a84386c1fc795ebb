//! Provider-facing half of the sign-in gateway.
//!
//! ARCHITECTURE
//! ============
//! Discovery runs once at startup; the resulting metadata is shared through
//! `AppState`. Each callback then performs one form POST to the token
//! endpoint using the confidential client's secret, which never leaves the
//! server.
//!
//! TRADE-OFFS
//! ==========
//! Access-token claims are decoded without signature verification. They are
//! echoed back to the browser for display only and are never trusted here.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::fmt::Write;

use oidc::{CallbackTokens, OidcError, ProviderMetadata, TokenResponse};
use rand::Rng;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Oidc(#[from] OidcError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("discovery returned {status}")]
    Discovery { status: u16 },
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },
    #[error("unexpected token response: {0}")]
    UnexpectedResponse(String),
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Random 16-byte hex value for the `state` parameter.
#[must_use]
pub fn generate_state() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Fetch and validate the discovery document for `issuer`.
///
/// # Errors
///
/// Returns an error if the request fails, the provider answers with a
/// non-success status, or the document lacks a required endpoint.
pub async fn discover(http: &reqwest::Client, issuer: &Url) -> Result<ProviderMetadata, GatewayError> {
    let url = oidc::discovery_url(issuer)?;
    let resp = http.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(GatewayError::Discovery { status: resp.status().as_u16() });
    }
    let body = resp.text().await?;
    Ok(ProviderMetadata::from_json(&body)?)
}

/// Trade an authorization code for tokens at the provider's token endpoint.
///
/// # Errors
///
/// Returns an error if the request fails, the endpoint rejects the code, or
/// the response is not a token payload.
pub async fn exchange_code(
    http: &reqwest::Client,
    client: &oidc::Client,
    client_secret: &str,
    redirect_uri: &Url,
    code: &str,
) -> Result<TokenResponse, GatewayError> {
    let endpoint = client.metadata().token_endpoint()?;
    let resp = http
        .post(endpoint)
        .basic_auth(client.client_id(), Some(client_secret))
        .header("Accept", "application/json")
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", client.client_id()),
        ])
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(GatewayError::TokenEndpoint { status: status.as_u16(), body });
    }
    serde_json::from_str(&body).map_err(|_| GatewayError::UnexpectedResponse(body))
}

/// Shape a token response into the payload returned to the browser.
///
/// # Errors
///
/// Returns [`OidcError::MalformedJwt`] if the access token is not a JWT.
pub fn callback_tokens(tokens: TokenResponse) -> Result<CallbackTokens, OidcError> {
    let jwt_claims = oidc::decode_unverified_claims(&tokens.access_token)?;
    Ok(CallbackTokens { access_token: tokens.access_token, refresh_token: tokens.refresh_token, jwt_claims })
}
