use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sso_core::domain::normalize_domain;
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::registry::DomainRegistryEntry;
use sso_core::repository::DomainRegistryRepository;
use tracing::info;

/// Read-mostly registry behind a reader/writer lock. Administrative
/// writes are rare; lookups take a shared lock for a single map probe.
#[derive(Clone, Default)]
pub struct MemoryDomainRegistry {
    entries: Arc<RwLock<HashMap<String, DomainRegistryEntry>>>,
}

impl MemoryDomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured entries, normalizing each domain.
    /// Later duplicates replace earlier ones.
    pub fn from_entries(
        entries: impl IntoIterator<Item = DomainRegistryEntry>,
    ) -> SsoResult<Self> {
        let mut map = HashMap::new();
        for entry in entries {
            let domain = normalize_domain(&entry.domain)?;
            map.insert(domain.clone(), DomainRegistryEntry { domain, ..entry });
        }
        Ok(Self {
            entries: Arc::new(RwLock::new(map)),
        })
    }
}

impl DomainRegistryRepository for MemoryDomainRegistry {
    async fn lookup(&self, domain: &str) -> SsoResult<DomainRegistryEntry> {
        let domain = normalize_domain(domain)?;
        self.entries
            .read()
            .get(&domain)
            .cloned()
            .ok_or(SsoError::DomainNotRegistered { domain })
    }

    async fn upsert(&self, entry: DomainRegistryEntry) -> SsoResult<DomainRegistryEntry> {
        let domain = normalize_domain(&entry.domain)?;
        let entry = DomainRegistryEntry { domain, ..entry };
        self.entries
            .write()
            .insert(entry.domain.clone(), entry.clone());
        info!(domain = %entry.domain, application = %entry.application_name, "Registry entry stored");
        Ok(entry)
    }

    async fn remove(&self, domain: &str) -> SsoResult<()> {
        let domain = normalize_domain(domain)?;
        self.entries.write().remove(&domain);
        Ok(())
    }

    async fn list(&self) -> SsoResult<Vec<DomainRegistryEntry>> {
        let mut entries: Vec<_> = self.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| a.domain.cmp(&b.domain));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use sso_core::models::principal::Role;

    use super::*;

    fn entry(domain: &str) -> DomainRegistryEntry {
        DomainRegistryEntry {
            domain: domain.into(),
            application_name: format!("app for {domain}"),
            allowed_roles: None,
        }
    }

    #[tokio::test]
    async fn lookup_normalizes_input() {
        let registry = MemoryDomainRegistry::from_entries([entry("Apps.Example.com")]).unwrap();
        let found = registry
            .lookup("https://APPS.example.com:8443/path")
            .await
            .unwrap();
        assert_eq!(found.domain, "apps.example.com");
    }

    #[tokio::test]
    async fn unknown_and_malformed_are_distinct() {
        let registry = MemoryDomainRegistry::from_entries([entry("apps.example.com")]).unwrap();
        assert!(matches!(
            registry.lookup("evil.example").await,
            Err(SsoError::DomainNotRegistered { .. })
        ));
        assert!(matches!(
            registry.lookup("").await,
            Err(SsoError::InvalidDomain { .. })
        ));
    }

    #[tokio::test]
    async fn upsert_replaces_and_remove_deletes() {
        let registry = MemoryDomainRegistry::new();
        registry.upsert(entry("docs.example.com")).await.unwrap();
        registry
            .upsert(DomainRegistryEntry {
                allowed_roles: Some(BTreeSet::from([Role::Admin])),
                ..entry("DOCS.example.com")
            })
            .await
            .unwrap();

        let listed = registry.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].permits(Role::User));

        registry.remove("docs.example.com").await.unwrap();
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[test]
    fn malformed_configured_domain_is_rejected() {
        assert!(MemoryDomainRegistry::from_entries([entry("bad domain")]).is_err());
    }
}
