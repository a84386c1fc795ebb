//! Sign-in configuration baked into the client at build time.
//!
//! SYSTEM CONTEXT
//! ==============
//! The WASM bundle has no process environment, so values are read with
//! `option_env!` when the crate is compiled. Every value is required and,
//! apart from the client id, must be an absolute URL. A missing or relative
//! value means the bundle was built for no deployment at all, and the
//! entrypoints refuse to start.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use url::Url;

pub const ISSUER_ORIGIN_VAR: &str = "HAMKKE_ISSUER_ORIGIN";
pub const CLIENT_ID_VAR: &str = "HAMKKE_CLIENT_ID";
pub const REDIRECT_URI_VAR: &str = "HAMKKE_REDIRECT_URI";
pub const LOGIN_URL_VAR: &str = "HAMKKE_LOGIN_URL";
pub const CALLBACK_URL_VAR: &str = "HAMKKE_CALLBACK_URL";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {var}")]
    Missing { var: &'static str },
    #[error("invalid url in {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
}

/// Identity-provider coordinates used by the session store and pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    /// Hosted-UI origin; discovery and logout hang off it.
    pub issuer_origin: Url,
    pub client_id: String,
    /// Where the provider sends the browser after sign-out.
    pub redirect_uri: Url,
    /// Gateway endpoint that starts the authorization-code redirect.
    pub login_url: Url,
    /// Gateway endpoint that trades a code for tokens.
    pub callback_url: Url,
}

impl AuthConfig {
    /// Load from values inlined at compile time.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable was unset at build time or is not a valid URL.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                ISSUER_ORIGIN_VAR => option_env!("HAMKKE_ISSUER_ORIGIN"),
                CLIENT_ID_VAR => option_env!("HAMKKE_CLIENT_ID"),
                REDIRECT_URI_VAR => option_env!("HAMKKE_REDIRECT_URI"),
                LOGIN_URL_VAR => option_env!("HAMKKE_LOGIN_URL"),
                CALLBACK_URL_VAR => option_env!("HAMKKE_CALLBACK_URL"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    /// Load through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is missing, blank, or not a valid URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { var })
        };
        let required_url = |var: &'static str| -> Result<Url, ConfigError> {
            let raw = required(var)?;
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl { var, reason: e.to_string() })
        };

        Ok(Self {
            issuer_origin: required_url(ISSUER_ORIGIN_VAR)?,
            client_id: required(CLIENT_ID_VAR)?,
            redirect_uri: required_url(REDIRECT_URI_VAR)?,
            login_url: required_url(LOGIN_URL_VAR)?,
            callback_url: required_url(CALLBACK_URL_VAR)?,
        })
    }
}
