//! Identity-provider HTTP calls: discovery and user-info.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): the session store never initializes during SSR, so the
//! stub only reports [`SessionError::Unavailable`].

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use async_trait::async_trait;
use oidc::{Client, ProviderMetadata, UserInfo};
use url::Url;

use crate::net::storage::SessionToken;
use crate::state::session::SessionError;

/// The two provider round trips the session store depends on.
#[async_trait(?Send)]
pub trait OidcClient {
    /// Fetch and validate the discovery document for `issuer`.
    async fn discover(&self, issuer: &Url) -> Result<ProviderMetadata, SessionError>;

    /// Resolve `token` into an identity through the client's user-info endpoint.
    async fn userinfo(&self, client: &Client, token: &SessionToken) -> Result<UserInfo, SessionError>;
}

/// Browser `fetch`-backed provider client.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpOidcClient;

#[cfg(any(test, feature = "hydrate"))]
fn bearer_header(token: &SessionToken) -> String {
    format!("Bearer {}", token.as_str())
}

/// Map a user-info HTTP status to the session error it represents.
#[cfg(any(test, feature = "hydrate"))]
fn userinfo_status_error(status: u16) -> Option<SessionError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(SessionError::Rejected { status }),
        _ => Some(SessionError::UserInfo(format!("status {status}"))),
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn discovery_status_error(status: u16) -> Option<SessionError> {
    if (200..300).contains(&status) {
        None
    } else {
        Some(SessionError::Discovery(format!("status {status}")))
    }
}

#[async_trait(?Send)]
impl OidcClient for HttpOidcClient {
    async fn discover(&self, issuer: &Url) -> Result<ProviderMetadata, SessionError> {
        #[cfg(feature = "hydrate")]
        {
            let url = oidc::discovery_url(issuer)?;
            let resp = gloo_net::http::Request::get(url.as_str())
                .send()
                .await
                .map_err(|e| SessionError::Discovery(e.to_string()))?;
            if let Some(err) = discovery_status_error(resp.status()) {
                return Err(err);
            }
            let body = resp
                .text()
                .await
                .map_err(|e| SessionError::Discovery(e.to_string()))?;
            Ok(ProviderMetadata::from_json(&body)?)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = issuer;
            Err(SessionError::Unavailable)
        }
    }

    async fn userinfo(&self, client: &Client, token: &SessionToken) -> Result<UserInfo, SessionError> {
        #[cfg(feature = "hydrate")]
        {
            let endpoint = client.metadata().userinfo_endpoint()?;
            let resp = gloo_net::http::Request::get(endpoint.as_str())
                .header("Authorization", &bearer_header(token))
                .send()
                .await
                .map_err(|e| SessionError::UserInfo(e.to_string()))?;
            if let Some(err) = userinfo_status_error(resp.status()) {
                return Err(err);
            }
            resp.json::<UserInfo>()
                .await
                .map_err(|e| SessionError::UserInfo(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (client, token);
            Err(SessionError::Unavailable)
        }
    }
}
