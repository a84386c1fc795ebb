//! Service layer used by the gateway routes.

pub mod gateway;
