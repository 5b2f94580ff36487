use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::credential::{CreateMasterCredential, MasterCredentialRecord};
use sso_core::repository::CredentialRepository;

use crate::secret::{generate_credential, hash_secret};

#[derive(Clone, Default)]
pub struct MemoryCredentialRepository {
    inner: Arc<DashMap<String, MasterCredentialRecord>>,
    pepper: Option<String>,
}

impl MemoryCredentialRepository {
    pub fn new(pepper: Option<String>) -> Self {
        Self {
            inner: Arc::default(),
            pepper,
        }
    }

    /// Load pre-hashed records, e.g. from an administrative export.
    pub fn from_records(
        records: impl IntoIterator<Item = MasterCredentialRecord>,
        pepper: Option<String>,
    ) -> Self {
        let repo = Self::new(pepper);
        for record in records {
            repo.inner.insert(record.credential_id.clone(), record);
        }
        repo
    }
}

impl CredentialRepository for MemoryCredentialRepository {
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
        self.inner.insert(credential_id.clone(), record.clone());
        Ok((record, format!("{credential_id}.{secret}")))
    }

    async fn get_by_id(&self, credential_id: &str) -> SsoResult<MasterCredentialRecord> {
        self.inner
            .get(credential_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| SsoError::NotFound {
                entity: "master_credential".into(),
                id: credential_id.to_string(),
            })
    }

    async fn revoke(&self, credential_id: &str) -> SsoResult<()> {
        let mut record = self
            .inner
            .get_mut(credential_id)
            .ok_or_else(|| SsoError::NotFound {
                entity: "master_credential".into(),
                id: credential_id.to_string(),
            })?;
        record.revoked = true;
        Ok(())
    }
}
