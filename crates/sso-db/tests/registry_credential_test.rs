//! Integration tests for the SurrealDB domain registry and credential
//! store using in-memory SurrealDB.

use std::collections::BTreeSet;

use sso_core::error::SsoError;
use sso_core::models::credential::CreateMasterCredential;
use sso_core::models::principal::{Principal, Role};
use sso_core::models::registry::DomainRegistryEntry;
use sso_core::repository::{CredentialRepository, DomainRegistryRepository};
use sso_db::repository::{SurrealCredentialRepository, SurrealDomainRegistry};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sso_db::run_migrations(&db).await.unwrap();
    db
}

// -----------------------------------------------------------------------
// Domain registry
// -----------------------------------------------------------------------

#[tokio::test]
async fn upsert_then_lookup_normalized() {
    let registry = SurrealDomainRegistry::new(setup().await);
    let stored = registry
        .upsert(DomainRegistryEntry {
            domain: "HTTPS://Apps.Example.com".into(),
            application_name: "Apps".into(),
            allowed_roles: None,
        })
        .await
        .unwrap();
    assert_eq!(stored.domain, "apps.example.com");

    let found = registry.lookup("apps.example.com:443").await.unwrap();
    assert_eq!(found.application_name, "Apps");
    assert_eq!(found.allowed_roles, None);
}

#[tokio::test]
async fn role_restriction_round_trips() {
    let registry = SurrealDomainRegistry::new(setup().await);
    registry
        .upsert(DomainRegistryEntry {
            domain: "admin.example.com".into(),
            application_name: "Admin Console".into(),
            allowed_roles: Some(BTreeSet::from([Role::Admin])),
        })
        .await
        .unwrap();

    let found = registry.lookup("admin.example.com").await.unwrap();
    assert!(found.permits(Role::Admin));
    assert!(!found.permits(Role::User));
}

#[tokio::test]
async fn unregistered_and_malformed_domains() {
    let registry = SurrealDomainRegistry::new(setup().await);
    assert!(matches!(
        registry.lookup("evil.example").await,
        Err(SsoError::DomainNotRegistered { .. })
    ));
    assert!(matches!(
        registry.lookup("not a domain").await,
        Err(SsoError::InvalidDomain { .. })
    ));
}

#[tokio::test]
async fn list_and_remove() {
    let registry = SurrealDomainRegistry::new(setup().await);
    for domain in ["b.example.com", "a.example.com"] {
        registry
            .upsert(DomainRegistryEntry {
                domain: domain.into(),
                application_name: domain.into(),
                allowed_roles: None,
            })
            .await
            .unwrap();
    }

    let domains: Vec<_> = registry
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.domain)
        .collect();
    assert_eq!(domains, vec!["a.example.com", "b.example.com"]);

    registry.remove("a.example.com").await.unwrap();
    assert_eq!(registry.list().await.unwrap().len(), 1);
}

// -----------------------------------------------------------------------
// Credentials
// -----------------------------------------------------------------------

fn principal() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role: Role::User,
        permissions: BTreeSet::from(["apps:launch".to_string()]),
        company_id: None,
        subscription_tier: "free".into(),
    }
}

#[tokio::test]
async fn create_and_get_credential() {
    let repo = SurrealCredentialRepository::new(setup().await, None);
    let p = principal();
    let (record, raw) = repo
        .create(CreateMasterCredential {
            principal: p.clone(),
        })
        .await
        .unwrap();

    assert!(raw.starts_with(&format!("{}.", record.credential_id)));
    assert!(!raw.contains(&record.secret_hash));

    let fetched = repo.get_by_id(&record.credential_id).await.unwrap();
    assert_eq!(fetched.principal, p);
    assert!(!fetched.revoked);
    assert!(fetched.secret_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn revoke_marks_credential() {
    let repo = SurrealCredentialRepository::new(setup().await, None);
    let (record, _) = repo
        .create(CreateMasterCredential {
            principal: principal(),
        })
        .await
        .unwrap();

    repo.revoke(&record.credential_id).await.unwrap();
    assert!(repo.get_by_id(&record.credential_id).await.unwrap().revoked);
}

#[tokio::test]
async fn unknown_credential_is_not_found() {
    let repo = SurrealCredentialRepository::new(setup().await, None);
    assert!(matches!(
        repo.get_by_id("mc_missing").await,
        Err(SsoError::NotFound { .. })
    ));
    assert!(matches!(
        repo.revoke("mc_missing").await,
        Err(SsoError::NotFound { .. })
    ));
}
