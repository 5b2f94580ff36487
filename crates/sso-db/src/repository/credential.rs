//! SurrealDB implementation of [`CredentialRepository`].

use chrono::{DateTime, Utc};
use sso_core::error::SsoResult;
use sso_core::models::credential::{CreateMasterCredential, MasterCredentialRecord};
use sso_core::repository::CredentialRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use super::principal_from_row;
use crate::error::DbError;
use crate::secret::{generate_credential, hash_secret};

#[derive(Debug, SurrealValue)]
struct CredentialRow {
    secret_hash: String,
    principal_id: String,
    role: String,
    permissions: Vec<String>,
    company_id: Option<String>,
    subscription_tier: String,
    revoked: bool,
    created_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_record(self, credential_id: String) -> Result<MasterCredentialRecord, DbError> {
        let principal = principal_from_row(
            &self.principal_id,
            &self.role,
            self.permissions,
            self.company_id.as_deref(),
            self.subscription_tier,
        )?;
        Ok(MasterCredentialRecord {
            credential_id,
            secret_hash: self.secret_hash,
            principal,
            revoked: self.revoked,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the master-credential store.
///
/// Secrets are hashed with Argon2id; the optional pepper given at
/// construction must match the one the session issuer verifies with.
#[derive(Clone)]
pub struct SurrealCredentialRepository<C: Connection> {
    db: Surreal<C>,
    pepper: Option<String>,
}

impl<C: Connection> SurrealCredentialRepository<C> {
    pub fn new(db: Surreal<C>, pepper: Option<String>) -> Self {
        Self { db, pepper }
    }

    /// Store a pre-hashed credential record as-is (administrative import).
    pub async fn import(&self, record: MasterCredentialRecord) -> SsoResult<()> {
        self.write(&record).await
    }

    async fn write(&self, record: &MasterCredentialRecord) -> SsoResult<()> {
        let principal = &record.principal;
        self.db
            .query(
                "UPSERT type::record('master_credential', $id) SET \
                 secret_hash = $secret_hash, \
                 principal_id = $principal_id, \
                 role = $role, \
                 permissions = $permissions, \
                 company_id = $company_id, \
                 subscription_tier = $subscription_tier, \
                 revoked = $revoked, \
                 created_at = $created_at",
            )
            .bind(("id", record.credential_id.clone()))
            .bind(("secret_hash", record.secret_hash.clone()))
            .bind(("principal_id", principal.id.to_string()))
            .bind(("role", principal.role.as_str().to_string()))
            .bind((
                "permissions",
                principal.permissions.iter().cloned().collect::<Vec<_>>(),
            ))
            .bind(("company_id", principal.company_id.map(|c| c.to_string())))
            .bind(("subscription_tier", principal.subscription_tier.clone()))
            .bind(("revoked", record.revoked))
            .bind(("created_at", record.created_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }
}

impl<C: Connection> CredentialRepository for SurrealCredentialRepository<C> {
    async fn create(
        &self,
        input: CreateMasterCredential,
    ) -> SsoResult<(MasterCredentialRecord, String)> {
        let (credential_id, secret) = generate_credential();
        let record = MasterCredentialRecord {
            credential_id: credential_id.clone(),
            secret_hash: hash_secret(&secret, self.pepper.as_deref())?,
            principal: input.principal,
            revoked: false,
            created_at: Utc::now(),
        };
        self.write(&record).await?;

        info!(%credential_id, principal_id = %record.principal.id, "Master credential created");
        Ok((record, format!("{credential_id}.{secret}")))
    }

    async fn get_by_id(&self, credential_id: &str) -> SsoResult<MasterCredentialRecord> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('master_credential', $id)")
            .bind(("id", credential_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CredentialRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "master_credential".into(),
            id: credential_id.to_string(),
        })?;

        row.into_record(credential_id.to_string()).map_err(Into::into)
    }

    async fn revoke(&self, credential_id: &str) -> SsoResult<()> {
        let mut result = self
            .db
            .query("UPDATE type::record('master_credential', $id) SET revoked = true RETURN AFTER")
            .bind(("id", credential_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CredentialRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "master_credential".into(),
                id: credential_id.to_string(),
            }
            .into());
        }
        info!(%credential_id, "Master credential revoked");
        Ok(())
    }
}
