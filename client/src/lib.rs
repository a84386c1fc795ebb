//! # hamkke-client
//!
//! Leptos + WASM frontend for Hamkke sign-in.
//!
//! This crate contains the session store, the landing/callback/home pages,
//! and the browser glue (token storage, provider HTTP calls, navigation) they
//! are injected with.

pub mod app;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entrypoint: hydrate the server-rendered body.
///
/// # Panics
///
/// Panics if the bundle was built without its sign-in configuration.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::App;
    use leptos::prelude::*;

    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let config = config::AuthConfig::from_build_env().expect("sign-in configuration missing at build time");
    leptos::mount::hydrate_body(move || view! { <App config/> });
}
