//! Gateway configuration read from the process environment.
//!
//! Required: `COGNITO_CLIENT_ID`, `COGNITO_CLIENT_SECRET`,
//! `COGNITO_REDIRECT_URI`, `COGNITO_ISSUER_URL`. Optional: `PORT` (default
//! 3000) and `COOKIE_SECURE` (defaults to whether the redirect URI is https).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use url::Url;

pub const CLIENT_ID_VAR: &str = "COGNITO_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "COGNITO_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "COGNITO_REDIRECT_URI";
pub const ISSUER_URL_VAR: &str = "COGNITO_ISSUER_URL";
pub const PORT_VAR: &str = "PORT";
pub const COOKIE_SECURE_VAR: &str = "COOKIE_SECURE";

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} required")]
    Missing { var: &'static str },
    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
}

#[derive(Clone)]
pub struct ServerConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub issuer_url: Url,
    pub port: u16,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("issuer_url", &self.issuer_url.as_str())
            .field("port", &self.port)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or malformed variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { var })
        };
        let url = |var: &'static str| {
            let raw = required(var)?;
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl { var, reason: e.to_string() })
        };

        let client_id = required(CLIENT_ID_VAR)?;
        let client_secret = required(CLIENT_SECRET_VAR)?;
        let redirect_uri = url(REDIRECT_URI_VAR)?;
        let issuer_url = url(ISSUER_URL_VAR)?;

        let port = match lookup(PORT_VAR).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let cookie_secure = lookup(COOKIE_SECURE_VAR)
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(redirect_uri.scheme() == "https");

        Ok(Self { client_id, client_secret, redirect_uri, issuer_url, port, cookie_secure })
    }
}

/// Lenient boolean parse for env flags.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
