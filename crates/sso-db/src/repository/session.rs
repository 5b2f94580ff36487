//! SurrealDB implementation of [`SessionRepository`].

use chrono::{DateTime, Utc};
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::session::{Session, SessionId};
use sso_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::principal_from_row;
use crate::error::{DbError, create_failure};
use crate::secret::session_key;

#[derive(Debug, SurrealValue)]
struct SessionRow {
    principal_id: String,
    role: String,
    permissions: Vec<String>,
    company_id: Option<String>,
    subscription_tier: String,
    source_credential_fingerprint: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self, session_id: SessionId) -> Result<Session, DbError> {
        let principal = principal_from_row(
            &self.principal_id,
            &self.role,
            self.permissions,
            self.company_id.as_deref(),
            self.subscription_tier,
        )?;
        Ok(Session {
            session_id,
            principal,
            created_at: self.created_at,
            expires_at: self.expires_at,
            source_credential_fingerprint: self.source_credential_fingerprint,
        })
    }
}

/// SurrealDB implementation of the session store.
///
/// Expiry is checked on read; [`SessionRepository::cleanup_expired`]
/// removes whatever readers never touched.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn put(&self, session: Session) -> SsoResult<()> {
        let key = session_key(&session.session_id);
        let principal = session.principal;

        self.db
            .query(
                "CREATE type::record('session', $key) SET \
                 principal_id = $principal_id, \
                 role = $role, \
                 permissions = $permissions, \
                 company_id = $company_id, \
                 subscription_tier = $subscription_tier, \
                 source_credential_fingerprint = $fingerprint, \
                 created_at = $created_at, \
                 expires_at = $expires_at",
            )
            .bind(("key", key))
            .bind(("principal_id", principal.id.to_string()))
            .bind(("role", principal.role.as_str().to_string()))
            .bind((
                "permissions",
                principal.permissions.into_iter().collect::<Vec<_>>(),
            ))
            .bind(("company_id", principal.company_id.map(|c| c.to_string())))
            .bind(("subscription_tier", principal.subscription_tier))
            .bind(("fingerprint", session.source_credential_fingerprint))
            .bind(("created_at", session.created_at))
            .bind(("expires_at", session.expires_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| create_failure("session", e))?;

        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> SsoResult<Session> {
        let key = session_key(session_id);

        let mut result = self
            .db
            .query("SELECT * FROM type::record('session', $key)")
            .bind(("key", key.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(SsoError::SessionNotFound)?;
        let session = row.into_session(session_id.clone())?;

        if session.is_expired() {
            debug!(session = %session_id, "Evicting expired session on read");
            self.db
                .query("DELETE type::record('session', $key)")
                .bind(("key", key))
                .await
                .map_err(DbError::from)?;
            return Err(SsoError::SessionExpired);
        }

        Ok(session)
    }

    async fn delete(&self, session_id: &SessionId) -> SsoResult<()> {
        self.db
            .query("DELETE type::record('session', $key)")
            .bind(("key", session_key(session_id)))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_by_principal(&self, principal_id: Uuid) -> SsoResult<u64> {
        let mut result = self
            .db
            .query("DELETE session WHERE principal_id = $principal_id RETURN BEFORE")
            .bind(("principal_id", principal_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let removed: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        Ok(removed.len() as u64)
    }

    async fn cleanup_expired(&self) -> SsoResult<u64> {
        let mut result = self
            .db
            .query("DELETE session WHERE expires_at < time::now() RETURN BEFORE")
            .await
            .map_err(DbError::from)?;

        let removed: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        Ok(removed.len() as u64)
    }
}
