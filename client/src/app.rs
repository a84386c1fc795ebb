//! Root application component with routing and the session context.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::config::AuthConfig;
use crate::pages::{callback::CallbackPage, home::HomePage, landing::LandingPage};
use crate::state::session::BrowserSessionStore;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions, config: AuthConfig) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App config/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Creates the page's single session store, starts its token lookup in the
/// browser, and sets up client-side routing.
#[component]
pub fn App(config: AuthConfig) -> impl IntoView {
    provide_meta_context();

    let session = BrowserSessionStore::browser(config);
    provide_context(session.clone());

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move { session.initialize().await });
    #[cfg(not(feature = "hydrate"))]
    let _ = session;

    view! {
        <Stylesheet id="leptos" href="/pkg/hamkke.css"/>
        <Title text="Hamkke"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=StaticSegment("login") view=LandingPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("callback")) view=CallbackPage/>
            </Routes>
        </Router>
    }
}
