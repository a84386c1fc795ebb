//! Home page: where signed-in users land.
//!
//! Shows who is signed in and offers sign-out. Signed-out visitors are sent to
//! `/login` once the session lookup finishes.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::state::session::BrowserSessionStore;
use crate::util::auth::install_unauth_redirect;

#[component]
pub fn HomePage() -> impl IntoView {
    let session = expect_context::<BrowserSessionStore>();
    let auth = session.auth();
    install_unauth_redirect(auth, use_navigate());

    let on_logout = move |_: leptos::ev::MouseEvent| session.logout();

    view! {
        <Show
            when=move || auth.with(|a| a.is_authenticated())
            fallback=|| view! {
                <div class="landing landing--loading">
                    <div class="landing__status">"Loading..."</div>
                </div>
            }
        >
            <div class="home">
                <header class="home__header">
                    {move || {
                        auth.get()
                            .user
                            .and_then(|user| user.picture_url)
                            .map(|src| view! { <img class="home__avatar" src=src alt="Profile picture"/> })
                    }}
                    <span class="home__name">
                        {move || auth.get().user.map(|user| user.label().to_owned()).unwrap_or_default()}
                    </span>
                    <button class="landing__button" type="button" on:click=on_logout.clone()>
                        "Sign out"
                    </button>
                </header>
            </div>
        </Show>
    }
}
