//! Full-page navigation out of the application.
//!
//! Login and logout leave the app for the identity provider. The session store
//! hands an [`ExternalRedirect`] to a [`Navigator`] so the target URL can be
//! asserted in tests while the browser implementation assigns
//! `window.location`.

use url::Url;

/// A navigation that unloads the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalRedirect {
    url: Url,
}

impl ExternalRedirect {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Performs external redirects. Nothing after `redirect` is guaranteed to run.
pub trait Navigator {
    fn redirect(&self, target: &ExternalRedirect);
}

/// Assigns `window.location.href`. No-op during SSR.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn redirect(&self, target: &ExternalRedirect) {
        log::debug!("redirecting to {}", target.url().origin().ascii_serialization());
        assign_location(target.as_str());
    }
}

/// Full navigation to `href`, reloading the app at the new location.
pub fn assign_location(href: &str) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(href);
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = href;
    }
}
