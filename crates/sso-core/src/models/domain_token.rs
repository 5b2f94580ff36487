//! Domain token model.
//!
//! A domain token is a short-lived, signed proof of identity scoped to a
//! single child-application domain. It travels in a launch URL, so the
//! broker never stores it and its `Debug` output omits the signed value.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Role;

#[derive(Clone, Serialize, Deserialize)]
pub struct DomainToken {
    /// Signed token value.
    pub token: String,
    /// Normalized domain the token is bound to.
    pub domain: String,
    pub application_name: String,
    pub principal_id: Uuid,
    pub role: Role,
    pub permissions: BTreeSet<String>,
    pub company_id: Option<Uuid>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for DomainToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainToken")
            .field("token", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("application_name", &self.application_name)
            .field("principal_id", &self.principal_id)
            .field("role", &self.role)
            .field("permissions", &self.permissions)
            .field("company_id", &self.company_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
