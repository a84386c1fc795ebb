//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the gateway configuration, the relying-party client built from the
//! provider's discovery document, and one pooled HTTP client.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use oidc::ProviderMetadata;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub provider: Arc<oidc::Client>,
    pub http: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, metadata: ProviderMetadata, http: reqwest::Client) -> Self {
        let provider = oidc::Client::new(metadata, config.client_id.clone());
        Self { config: Arc::new(config), provider: Arc::new(provider), http }
    }
}
