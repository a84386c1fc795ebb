//! Shared auth redirect guards.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components should apply identical redirect behavior: signed-out users
//! leave protected pages for `/login`, signed-in users leave the landing page
//! for `/`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

/// Route the landing page sends signed-in users to.
pub const HOME_ROUTE: &str = "/";
/// Route protected pages send signed-out users to.
pub const LOGIN_ROUTE: &str = "/login";

/// Whether auth has loaded and no user is present.
#[must_use]
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.user.is_none()
}

/// Whether this update is a transition into the authenticated state.
///
/// `was_authenticated` is the value the guard computed on its previous run,
/// `None` on the first run.
#[must_use]
pub fn should_redirect_home(was_authenticated: Option<bool>, state: &AuthState) -> bool {
    state.is_authenticated() && was_authenticated != Some(true)
}

/// Redirect to `/login` whenever auth has loaded and no user is present.
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + 'static,
{
    Effect::new(move || {
        let state = auth.get();
        if should_redirect_unauth(&state) {
            navigate(LOGIN_ROUTE, NavigateOptions::default());
        }
    });
}

/// Redirect to `/` once per transition into the authenticated state.
pub fn install_home_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + 'static,
{
    Effect::new(move |was_authenticated: Option<bool>| {
        auth.with(|state| {
            if should_redirect_home(was_authenticated, state) {
                navigate(HOME_ROUTE, NavigateOptions::default());
            }
            state.is_authenticated()
        })
    });
}
