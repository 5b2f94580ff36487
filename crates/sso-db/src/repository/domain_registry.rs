//! SurrealDB implementation of [`DomainRegistryRepository`].

use std::collections::BTreeSet;

use sso_core::domain::normalize_domain;
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::principal::Role;
use sso_core::models::registry::DomainRegistryEntry;
use sso_core::repository::DomainRegistryRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RegistryRow {
    application_name: String,
    allowed_roles: Option<Vec<String>>,
}

#[derive(Debug, SurrealValue)]
struct RegistryRowWithId {
    record_id: String,
    application_name: String,
    allowed_roles: Option<Vec<String>>,
}

fn parse_roles(roles: Option<Vec<String>>) -> Result<Option<BTreeSet<Role>>, DbError> {
    roles
        .map(|list| {
            list.iter()
                .map(|r| r.parse::<Role>().map_err(|e| DbError::Decode(e.to_string())))
                .collect::<Result<BTreeSet<_>, _>>()
        })
        .transpose()
}

impl RegistryRow {
    fn into_entry(self, domain: String) -> Result<DomainRegistryEntry, DbError> {
        Ok(DomainRegistryEntry {
            domain,
            application_name: self.application_name,
            allowed_roles: parse_roles(self.allowed_roles)?,
        })
    }
}

/// SurrealDB implementation of the domain registry.
#[derive(Clone)]
pub struct SurrealDomainRegistry<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDomainRegistry<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DomainRegistryRepository for SurrealDomainRegistry<C> {
    async fn lookup(&self, domain: &str) -> SsoResult<DomainRegistryEntry> {
        let domain = normalize_domain(domain)?;

        let mut result = self
            .db
            .query("SELECT * FROM type::record('domain_registry', $domain)")
            .bind(("domain", domain.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RegistryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| SsoError::DomainNotRegistered {
                domain: domain.clone(),
            })?;

        row.into_entry(domain).map_err(Into::into)
    }

    async fn upsert(&self, entry: DomainRegistryEntry) -> SsoResult<DomainRegistryEntry> {
        let domain = normalize_domain(&entry.domain)?;
        let roles = entry
            .allowed_roles
            .as_ref()
            .map(|set| set.iter().map(|r| r.as_str().to_string()).collect::<Vec<_>>());

        self.db
            .query(
                "UPSERT type::record('domain_registry', $domain) SET \
                 application_name = $application_name, \
                 allowed_roles = $allowed_roles",
            )
            .bind(("domain", domain.clone()))
            .bind(("application_name", entry.application_name.clone()))
            .bind(("allowed_roles", roles))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%domain, application = %entry.application_name, "Registry entry stored");

        Ok(DomainRegistryEntry { domain, ..entry })
    }

    async fn remove(&self, domain: &str) -> SsoResult<()> {
        let domain = normalize_domain(domain)?;
        self.db
            .query("DELETE type::record('domain_registry', $domain)")
            .bind(("domain", domain))
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list(&self) -> SsoResult<Vec<DomainRegistryEntry>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM domain_registry")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RegistryRowWithId> = result.take(0).map_err(DbError::from)?;
        let mut entries = rows
            .into_iter()
            .map(|row| {
                Ok(DomainRegistryEntry {
                    domain: row.record_id,
                    application_name: row.application_name,
                    allowed_roles: parse_roles(row.allowed_roles)?,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;
        entries.sort_by(|a, b| a.domain.cmp(&b.domain));
        Ok(entries)
    }
}
