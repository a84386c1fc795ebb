//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the gateway endpoints and stitches them with Leptos SSR
//! rendering under a single Axum router. Serving the pages and the gateway
//! from one origin keeps the `oauth_state` cookie visible to the callback
//! request the client makes.


pub mod auth;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use hamkke_client::app::{App, shell};
use hamkke_client::config::AuthConfig;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Gateway API routes under `/api` plus the liveness probe.
///
/// Unknown `/api/*` paths answer `Route not found`; every other path is left
/// for the page router.
pub fn api_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .fallback(route_not_found);

    Router::new()
        .nest("/api", api)
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// API routes + Leptos SSR pages + compiled client assets at `/pkg`.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded (missing or
/// malformed `[workspace.metadata.leptos]` section or `LEPTOS_*` variables).
pub fn app(state: AppState, client_config: AuthConfig) -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list({
        let config = client_config.clone();
        move || view! { <App config=config.clone()/> }
    });

    let leptos_router = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            let config = client_config.clone();
            move || shell(opts.clone(), config.clone())
        })
        .with_state(leptos_options.clone());

    // Unmatched page paths still render the app so its own not-found view shows.
    let not_found = leptos_axum::render_app_to_stream({
        let opts = leptos_options.clone();
        move || shell(opts.clone(), client_config.clone())
    });

    // Serve Leptos static assets (WASM, CSS, JS) from the site root /pkg directory.
    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(api_routes(state)
        .merge(leptos_router)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg")))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http()))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Route not found")
}
