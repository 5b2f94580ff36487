//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async so that in-memory and database
//! backed stores are interchangeable behind the issuer and minter.

use uuid::Uuid;

use crate::error::SsoResult;
use crate::models::{
    credential::{CreateMasterCredential, MasterCredentialRecord},
    registry::DomainRegistryEntry,
    session::{Session, SessionId},
};

// ---------------------------------------------------------------------------
// Session Store
// ---------------------------------------------------------------------------

/// Storage of active sessions with TTL semantics.
///
/// Expiry is authoritative: `get` never returns a session whose
/// `expires_at` has passed. Implementations answer such a read with
/// `SsoError::SessionExpired` and may evict the record at that point.
pub trait SessionRepository: Send + Sync {
    /// Insert a freshly issued session. Fails with `AlreadyExists` if
    /// the identifier is already present.
    fn put(&self, session: Session) -> impl Future<Output = SsoResult<()>> + Send;
    /// `SessionNotFound` when absent, `SessionExpired` when past expiry.
    fn get(&self, session_id: &SessionId) -> impl Future<Output = SsoResult<Session>> + Send;
    /// Remove a session. Removing an absent session is not an error.
    fn delete(&self, session_id: &SessionId) -> impl Future<Output = SsoResult<()>> + Send;
    /// Remove every session of a principal, returning how many were removed.
    fn delete_by_principal(
        &self,
        principal_id: Uuid,
    ) -> impl Future<Output = SsoResult<u64>> + Send;
    /// Remove all expired sessions.
    fn cleanup_expired(&self) -> impl Future<Output = SsoResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Domain Registry
// ---------------------------------------------------------------------------

/// Read-mostly lookup from normalized hostname to application identity.
///
/// Lookups normalize their input; malformed input fails with
/// `InvalidDomain`, unknown hosts with `DomainNotRegistered`.
pub trait DomainRegistryRepository: Send + Sync {
    fn lookup(&self, domain: &str) -> impl Future<Output = SsoResult<DomainRegistryEntry>> + Send;
    /// Insert or replace an entry. The stored domain is normalized.
    fn upsert(
        &self,
        entry: DomainRegistryEntry,
    ) -> impl Future<Output = SsoResult<DomainRegistryEntry>> + Send;
    fn remove(&self, domain: &str) -> impl Future<Output = SsoResult<()>> + Send;
    fn list(&self) -> impl Future<Output = SsoResult<Vec<DomainRegistryEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// Master credentials (identity collaborator)
// ---------------------------------------------------------------------------

pub trait CredentialRepository: Send + Sync {
    /// Create a credential for a principal. Returns the stored record
    /// and the raw credential string, which is never retrievable again.
    fn create(
        &self,
        input: CreateMasterCredential,
    ) -> impl Future<Output = SsoResult<(MasterCredentialRecord, String)>> + Send;
    fn get_by_id(
        &self,
        credential_id: &str,
    ) -> impl Future<Output = SsoResult<MasterCredentialRecord>> + Send;
    fn revoke(&self, credential_id: &str) -> impl Future<Output = SsoResult<()>> + Send;
}
