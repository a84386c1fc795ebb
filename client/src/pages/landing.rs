//! Landing page: sign-in surface for visitors, pass-through for members.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is where `/` sends signed-out users and where the provider's sign-out
//! page returns them. While the session store is still resolving a stored
//! token it shows a loading state; once a user is known it renders nothing and
//! navigates home.

#[cfg(test)]
#[path = "landing_test.rs"]
mod landing_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use oidc::IdentityProvider;

use crate::state::auth::AuthState;
use crate::state::session::BrowserSessionStore;
use crate::util::auth::install_home_redirect;

/// What the landing page shows for a given auth state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandingView {
    Loading,
    SignIn,
    /// Signed in: nothing rendered while the home redirect happens.
    Hidden,
}

#[must_use]
pub fn landing_view(state: &AuthState) -> LandingView {
    if state.loading {
        LandingView::Loading
    } else if state.user.is_some() {
        LandingView::Hidden
    } else {
        LandingView::SignIn
    }
}

const FOOTER_LINKS: [&str; 8] = [
    "About",
    "Help Center",
    "Terms of Service",
    "Privacy Policy",
    "Cookie Policy",
    "Accessibility",
    "Advertising",
    "Marketing",
];

#[component]
pub fn LandingPage() -> impl IntoView {
    let session = expect_context::<BrowserSessionStore>();
    let auth = session.auth();
    install_home_redirect(auth, use_navigate());

    move || match landing_view(&auth.get()) {
        LandingView::Loading => view! {
            <div class="landing landing--loading">
                <div class="landing__status">"Loading..."</div>
            </div>
        }
        .into_any(),
        LandingView::Hidden => ().into_any(),
        LandingView::SignIn => view! { <SignInPanel/> }.into_any(),
    }
}

/// Brand column plus the sign-in options.
#[component]
fn SignInPanel() -> impl IntoView {
    let session = expect_context::<BrowserSessionStore>();
    let sign_in = session.clone();
    let google = session.clone();
    let apple = session;

    view! {
        <div class="landing">
            <main class="landing__main">
                <div class="landing__brand">
                    <img class="landing__logo" src="/hamkke.svg" alt="Hamkke Logo"/>
                </div>
                <div class="landing__panel">
                    <h1 class="landing__title">"Better Together."</h1>
                    <h2 class="landing__subtitle">"Join Hamkke today."</h2>
                    <div class="landing__form">
                        <input class="landing__input" type="text" placeholder="Your email address"/>
                        <button class="landing__button landing__button--primary" type="button" on:click=move |_| sign_in.login(None)>
                            "Sign in"
                        </button>
                        <div class="landing__divider">
                            <span>"or"</span>
                        </div>
                        <button
                            class="landing__button"
                            type="button"
                            on:click=move |_| google.login(Some(IdentityProvider::Google))
                        >
                            <img class="landing__provider-icon" src="/images/google.svg" alt="Google"/>
                            "Continue with Google"
                        </button>
                        <button
                            class="landing__button"
                            type="button"
                            on:click=move |_| apple.login(Some(IdentityProvider::Apple))
                        >
                            <img class="landing__provider-icon" src="/images/apple_white.svg" alt="Apple"/>
                            "Continue with Apple"
                        </button>
                        <button class="landing__signup" type="button">
                            "Don't have an account?"
                            <span class="landing__signup-link">"Sign up"</span>
                        </button>
                    </div>
                </div>
            </main>
            <footer class="landing__footer">
                <nav class="landing__footer-nav">
                    {FOOTER_LINKS.map(|label| view! { <a href="#">{label}</a> })}
                    <span>"© 2025 Hamkke Corp."</span>
                </nav>
            </footer>
        </div>
    }
}
