//! Shared OpenID Connect model and URL builders for the sign-in flow.
//!
//! This crate owns the pieces of the identity-provider contract used by both
//! `server` (the auth gateway) and `client` (the browser session store): the
//! discovery document, the user-info payload, the callback token payload and
//! the redirect URLs each side constructs.
//!
//! Nothing here verifies a token. [`decode_unverified_claims`] only reads the
//! JWT payload for display.


use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Path appended to an issuer origin to locate its discovery document.
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// Scopes requested on every authorization redirect.
pub const DEFAULT_SCOPES: &str = "openid email profile";

/// Error returned by the model helpers in this crate.
#[derive(Debug, thiserror::Error)]
pub enum OidcError {
    /// A URL could not be parsed or built.
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The discovery document is missing a required endpoint.
    #[error("discovery document missing {0}")]
    MissingEndpoint(&'static str),
    /// The identity provider name is not one we offer.
    #[error("unknown identity provider: {0}")]
    UnknownProvider(String),
    /// The token is not a three-part JWT with a decodable payload.
    #[error("malformed jwt: {0}")]
    MalformedJwt(String),
    /// A JSON body did not match the expected shape.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_url(raw: &str) -> Result<Url, OidcError> {
    Url::parse(raw).map_err(|source| OidcError::InvalidUrl { url: raw.to_owned(), source })
}

/// Strip the trailing slash `Url` adds to bare origins.
fn origin_prefix(issuer: &Url) -> &str {
    issuer.as_str().trim_end_matches('/')
}

// =============================================================================
// IDENTITY PROVIDER
// =============================================================================

/// Federated identity provider offered on the sign-in page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityProvider {
    Google,
    Apple,
}

impl IdentityProvider {
    /// Wire value sent as the `provider` / `identity_provider` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Apple => "Apple",
        }
    }
}

impl fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityProvider {
    type Err = OidcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Google" => Ok(Self::Google),
            "Apple" => Ok(Self::Apple),
            other => Err(OidcError::UnknownProvider(other.to_owned())),
        }
    }
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// The fields of an OIDC discovery document this system relies on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,
}

impl ProviderMetadata {
    /// Parse and validate a discovery document body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON of the expected shape or if
    /// the token or user-info endpoint is absent.
    pub fn from_json(body: &str) -> Result<Self, OidcError> {
        let metadata: Self = serde_json::from_str(body)?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Check that the endpoints the sign-in flow needs are present.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::MissingEndpoint`] naming the first absent endpoint.
    pub fn validate(&self) -> Result<(), OidcError> {
        if self.authorization_endpoint.trim().is_empty() {
            return Err(OidcError::MissingEndpoint("authorization_endpoint"));
        }
        self.token_endpoint()?;
        self.userinfo_endpoint()?;
        Ok(())
    }

    /// The token endpoint as a parsed URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is missing or not a valid URL.
    pub fn token_endpoint(&self) -> Result<Url, OidcError> {
        required_endpoint(self.token_endpoint.as_deref(), "token_endpoint")
    }

    /// The user-info endpoint as a parsed URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is missing or not a valid URL.
    pub fn userinfo_endpoint(&self) -> Result<Url, OidcError> {
        required_endpoint(self.userinfo_endpoint.as_deref(), "userinfo_endpoint")
    }
}

fn required_endpoint(raw: Option<&str>, name: &'static str) -> Result<Url, OidcError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => parse_url(value),
        _ => Err(OidcError::MissingEndpoint(name)),
    }
}

/// Location of the discovery document for `issuer`.
///
/// # Errors
///
/// Returns an error if the joined URL fails to parse.
pub fn discovery_url(issuer: &Url) -> Result<Url, OidcError> {
    parse_url(&format!("{}{DISCOVERY_PATH}", origin_prefix(issuer)))
}

/// A relying-party client bound to discovered metadata and a client id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    metadata: ProviderMetadata,
    client_id: String,
}

impl Client {
    #[must_use]
    pub fn new(metadata: ProviderMetadata, client_id: impl Into<String>) -> Self {
        Self { metadata, client_id: client_id.into() }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    /// Build the authorization-code redirect for this client.
    ///
    /// # Errors
    ///
    /// Returns an error if the discovered authorization endpoint is not a URL.
    pub fn authorize_url(
        &self,
        redirect_uri: &str,
        state: &str,
        identity_provider: Option<IdentityProvider>,
    ) -> Result<Url, OidcError> {
        let mut url = parse_url(&self.metadata.authorization_endpoint)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", DEFAULT_SCOPES)
                .append_pair("state", state);
            if let Some(provider) = identity_provider {
                query.append_pair("identity_provider", provider.as_str());
            }
        }
        Ok(url)
    }
}

// =============================================================================
// REDIRECT URLS
// =============================================================================

/// Sign-in redirect: the gateway login endpoint, with `provider` only when one
/// was chosen.
#[must_use]
pub fn login_url(base: &Url, provider: Option<IdentityProvider>) -> Url {
    let mut url = base.clone();
    if let Some(provider) = provider {
        url.query_pairs_mut().append_pair("provider", provider.as_str());
    }
    url
}

/// Hosted-UI sign-out redirect for `issuer`.
///
/// # Errors
///
/// Returns an error if the joined URL fails to parse.
pub fn logout_url(issuer: &Url, client_id: &str, logout_uri: &Url) -> Result<Url, OidcError> {
    let mut url = parse_url(&format!("{}/logout", origin_prefix(issuer)))?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("logout_uri", logout_uri.as_str());
    Ok(url)
}

// =============================================================================
// USER INFO
// =============================================================================

/// Identity returned by the provider's user-info endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Stable subject identifier (`sub`).
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "picture", default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// Every other claim, passed through untouched.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl UserInfo {
    /// Best human-readable label: name, then email, then subject.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(self.subject.as_str())
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// Token endpoint response for the authorization-code grant.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Payload the gateway callback hands back to the browser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallbackTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub jwt_claims: Map<String, Value>,
}

/// Read the claims of a JWT without checking its signature.
///
/// # Errors
///
/// Returns [`OidcError::MalformedJwt`] if the token is not three dot-separated
/// segments, or the payload is not base64url-encoded JSON object.
pub fn decode_unverified_claims(token: &str) -> Result<Map<String, Value>, OidcError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(OidcError::MalformedJwt("expected three segments".to_owned()));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| OidcError::MalformedJwt(e.to_string()))?;
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(claims) => Ok(claims),
        _ => Err(OidcError::MalformedJwt("payload is not an object".to_owned())),
    }
}
