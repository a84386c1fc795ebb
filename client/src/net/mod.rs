//! Networking and browser-storage modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` talks to the auth gateway, `identity` to the identity provider, and
//! `storage` owns the persisted token slot.

pub mod api;
pub mod identity;
pub mod storage;
