//! Domain models for the SSO broker.
//!
//! These are the core types shared across all crates.

pub mod credential;
pub mod domain_token;
pub mod principal;
pub mod registry;
pub mod session;
