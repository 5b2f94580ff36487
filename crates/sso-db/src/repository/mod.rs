//! SurrealDB repository implementations.

mod credential;
mod domain_registry;
mod session;

pub use credential::SurrealCredentialRepository;
pub use domain_registry::SurrealDomainRegistry;
pub use session::SurrealSessionRepository;

use std::collections::BTreeSet;

use sso_core::models::principal::{Principal, Role};
use uuid::Uuid;

use crate::error::DbError;

/// Rebuild a principal snapshot from its flattened row columns.
fn principal_from_row(
    principal_id: &str,
    role: &str,
    permissions: Vec<String>,
    company_id: Option<&str>,
    subscription_tier: String,
) -> Result<Principal, DbError> {
    let id = Uuid::parse_str(principal_id)
        .map_err(|e| DbError::Decode(format!("invalid principal UUID: {e}")))?;
    let role = role
        .parse::<Role>()
        .map_err(|e| DbError::Decode(e.to_string()))?;
    let company_id = company_id
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|e| DbError::Decode(format!("invalid company UUID: {e}")))?;
    Ok(Principal {
        id,
        role,
        permissions: permissions.into_iter().collect::<BTreeSet<_>>(),
        company_id,
        subscription_tier,
    })
}
