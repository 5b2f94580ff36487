//! Master credential model.
//!
//! A master credential is the long-lived secret a user holds on the
//! platform, formatted as `<credential-id>.<secret>`. Only an Argon2id
//! hash of the secret is ever stored.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// Raw master credential as presented by a caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterCredential(String);

impl MasterCredential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Split into `(credential_id, secret)`. `None` when malformed.
    pub fn split(&self) -> Option<(&str, &str)> {
        let (id, secret) = self.0.split_once('.')?;
        if id.is_empty() || secret.is_empty() {
            return None;
        }
        Some((id, secret))
    }
}

impl fmt::Debug for MasterCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterCredential([REDACTED])")
    }
}

/// Stored form of a master credential, also the element type of the
/// credentials seed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCredentialRecord {
    pub credential_id: String,
    pub secret_hash: String,
    pub principal: Principal,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMasterCredential {
    pub principal: Principal,
}
