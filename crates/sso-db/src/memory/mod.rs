//! In-memory stores for process-lifetime deployments and tests.
//!
//! Every store is a cheap `Clone` handle over shared state, so the
//! issuer, the minter and the expiry sweeper can all hold the same one.

mod credential;
mod registry;
mod session;

pub use credential::MemoryCredentialRepository;
pub use registry::MemoryDomainRegistry;
pub use session::MemorySessionRepository;
