//! Session issuer: master-credential validation and session lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::credential::{MasterCredential, MasterCredentialRecord};
use sso_core::models::session::{Session, SessionId};
use sso_core::repository::{CredentialRepository, SessionRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{AuthConfig, expiry_after};
use crate::credential::CredentialVerifier;
use crate::error::AuthError;
use crate::token;

/// What a caller learns about a newly created session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub session_id: SessionId,
    pub expires_at: DateTime<Utc>,
}

/// Creates and destroys broker sessions.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the storage crate.
pub struct SessionIssuer<C: CredentialRepository, S: SessionRepository> {
    credentials: C,
    sessions: S,
    verifier: CredentialVerifier,
    config: AuthConfig,
}

impl<C: CredentialRepository, S: SessionRepository> SessionIssuer<C, S> {
    pub fn new(credentials: C, sessions: S, config: AuthConfig) -> Self {
        Self {
            credentials,
            sessions,
            verifier: CredentialVerifier::new(config.pepper.clone()),
            config,
        }
    }

    /// Validate a master credential and open a new session.
    ///
    /// Every successful call writes a distinct session; repeated calls
    /// with the same credential are not deduplicated.
    pub async fn create_session(
        &self,
        credential: Option<&MasterCredential>,
    ) -> SsoResult<SessionGrant> {
        let credential = credential.ok_or(AuthError::MissingCredential)?;
        let record = self.validate_credential(credential).await?;

        let created_at = Utc::now();
        let expires_at = expiry_after(created_at, self.config.session_lifetime_secs)?;
        let session = Session {
            session_id: token::generate_session_id(),
            principal: record.principal,
            created_at,
            expires_at,
            source_credential_fingerprint: token::fingerprint_credential(credential.expose()),
        };
        let grant = SessionGrant {
            session_id: session.session_id.clone(),
            expires_at: session.expires_at,
        };

        info!(
            session = %session.session_id,
            principal_id = %session.principal.id,
            expires_at = %session.expires_at,
            "Session created"
        );
        self.sessions.put(session).await?;

        Ok(grant)
    }

    /// Destroy a single session. Unknown sessions are ignored.
    pub async fn logout(&self, session_id: &SessionId) -> SsoResult<()> {
        self.sessions.delete(session_id).await?;
        info!(session = %session_id, "Session logged out");
        Ok(())
    }

    /// Destroy every session of a principal (e.g. on credential rotation).
    pub async fn revoke_principal_sessions(&self, principal_id: Uuid) -> SsoResult<u64> {
        let removed = self.sessions.delete_by_principal(principal_id).await?;
        info!(%principal_id, removed, "Principal sessions revoked");
        Ok(removed)
    }

    async fn validate_credential(
        &self,
        credential: &MasterCredential,
    ) -> SsoResult<MasterCredentialRecord> {
        let (credential_id, secret) = credential.split().ok_or(AuthError::MalformedCredential)?;

        let record = match self.credentials.get_by_id(credential_id).await {
            Ok(r) => r,
            Err(SsoError::NotFound { .. }) => {
                debug!(credential_id, "Unknown master credential");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        match self.verifier.check(&record, secret) {
            Ok(()) => Ok(record),
            Err(e) => {
                match &e {
                    AuthError::CredentialRevoked => {
                        warn!(credential_id, "Revoked master credential presented")
                    }
                    AuthError::InvalidCredentials => {
                        warn!(credential_id, "Master credential secret mismatch")
                    }
                    _ => warn!(credential_id, error = %e, "Master credential check failed"),
                }
                Err(e.into())
            }
        }
    }
}
