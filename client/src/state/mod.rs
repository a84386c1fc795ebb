//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `auth` is the plain state value components render from; `session` owns it
//! together with the services that change it.

pub mod auth;
pub mod session;
