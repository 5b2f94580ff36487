//! Domain registry model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::principal::Role;

/// Maps a normalized hostname to the application allowed to receive
/// tokens for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRegistryEntry {
    pub domain: String,
    pub application_name: String,
    /// `None` admits every role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_roles: Option<BTreeSet<Role>>,
}

impl DomainRegistryEntry {
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles
            .as_ref()
            .is_none_or(|roles| roles.contains(&role))
    }
}
