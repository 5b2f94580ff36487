//! SSO Database: session store, domain registry and credential store
//! implementations.
//!
//! This crate provides:
//! - Lock-free in-memory stores ([`memory`])
//! - A background expiry sweep for any session store ([`spawn_sweeper`])
//! - SurrealDB connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - SurrealDB-backed repositories ([`repository`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod memory;
pub mod repository;
mod schema;
mod secret;
mod sweeper;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use secret::{generate_credential, hash_secret, session_key};
pub use sweeper::spawn_sweeper;
