//! SSO Client: the consumer side of the broker.
//!
//! [`ClientSessionManager`] caches a broker session, requests domain
//! tokens on demand and recovers from an invalidated session with
//! exactly one re-authentication. [`SessionCoordinator`] fans logout and
//! health checks out across every manager sharing a browsing context.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod launch;
pub mod manager;
pub mod transport;

pub use cache::{CachedSession, FileSessionCache, MemorySessionCache, SessionCache};
pub use config::ClientConfig;
pub use coordinator::{LogoutReport, ManagedSession, SessionCoordinator};
pub use launch::{LaunchUrl, Launcher};
pub use manager::{ClientSessionManager, SessionState};
pub use transport::{HttpTransport, SsoTransport};
