//! Domain token minter.
//!
//! Claims are copied from the session's principal snapshot at mint
//! time. Permission changes made afterwards reach a child application
//! only once its current token expires, so the token lifetime is the
//! upper bound on claim staleness.

use sso_core::error::{SsoError, SsoResult};
use sso_core::models::domain_token::DomainToken;
use sso_core::models::session::SessionId;
use sso_core::repository::{DomainRegistryRepository, SessionRepository};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::token;

/// Issues domain-scoped tokens for live sessions.
///
/// Stateless per call: tokens are never cached or stored, and
/// concurrent mints share nothing but read access to the stores.
pub struct DomainTokenMinter<S: SessionRepository, R: DomainRegistryRepository> {
    sessions: S,
    registry: R,
    config: AuthConfig,
}

impl<S: SessionRepository, R: DomainRegistryRepository> DomainTokenMinter<S, R> {
    pub fn new(sessions: S, registry: R, config: AuthConfig) -> Self {
        Self {
            sessions,
            registry,
            config,
        }
    }

    pub async fn mint_domain_token(
        &self,
        session_id: &SessionId,
        domain: &str,
    ) -> SsoResult<DomainToken> {
        // 1. Session must exist and be unexpired.
        let session = self.sessions.get(session_id).await.inspect_err(|e| {
            debug!(session = %session_id, error = %e, "Session lookup failed");
        })?;
        if session.is_expired() {
            return Err(SsoError::SessionExpired);
        }

        // 2. Domain must be registered. Malformed input is reported the
        //    same way as an unknown domain.
        let entry = match self.registry.lookup(domain).await {
            Ok(entry) => entry,
            Err(SsoError::InvalidDomain { reason }) => {
                debug!(%reason, "Rejected malformed domain");
                return Err(SsoError::DomainNotRegistered {
                    domain: domain.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        // 3. Role restriction.
        if !entry.permits(session.principal.role) {
            warn!(
                domain = %entry.domain,
                role = %session.principal.role,
                principal_id = %session.principal.id,
                "Role not permitted for domain"
            );
            return Err(SsoError::Forbidden {
                reason: format!(
                    "role '{}' may not access {}",
                    session.principal.role, entry.domain
                ),
            });
        }

        // 4-5. Snapshot claims and sign.
        let minted =
            token::issue_domain_token(&session.principal, &entry, session.expires_at, &self.config)?;

        info!(
            session = %session_id,
            principal_id = %minted.principal_id,
            domain = %minted.domain,
            application = %minted.application_name,
            expires_at = %minted.expires_at,
            "Domain token minted"
        );

        Ok(minted)
    }
}
