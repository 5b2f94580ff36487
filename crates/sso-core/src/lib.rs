//! SSO Core: domain types, error taxonomy and storage traits shared by
//! the broker, its stores and the client session manager.

pub mod domain;
pub mod error;
pub mod models;
pub mod protocol;
pub mod repository;

pub use error::{ErrorKind, SsoError, SsoResult};
