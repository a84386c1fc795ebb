//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration; redirect rules live in
//! `util::auth` so pages apply them identically.

pub mod callback;
pub mod home;
pub mod landing;
