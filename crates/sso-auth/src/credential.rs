//! Master-credential checks against stored records.
//!
//! Stores keep an Argon2id PHC string of `pepper || secret` (see
//! `sso_db::hash_secret`); this side only ever verifies.

use argon2::password_hash::{Error as HashError, PasswordHash};
use argon2::{Argon2, PasswordVerifier};
use sso_core::models::credential::MasterCredentialRecord;

use crate::error::AuthError;

/// Decides whether a presented secret unlocks a stored credential.
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
    pepper: Option<String>,
}

impl CredentialVerifier {
    /// `pepper` must match the one the credential store hashed with.
    pub fn new(pepper: Option<String>) -> Self {
        Self {
            argon2: Argon2::default(),
            pepper,
        }
    }

    /// Accept `secret` for `record`.
    ///
    /// Revocation is checked before any hashing work. A stored hash that
    /// cannot be parsed is a `Crypto` error, not a mismatch.
    pub fn check(&self, record: &MasterCredentialRecord, secret: &str) -> Result<(), AuthError> {
        if record.revoked {
            return Err(AuthError::CredentialRevoked);
        }

        let stored = PasswordHash::new(&record.secret_hash).map_err(|e| {
            AuthError::Crypto(format!(
                "stored hash for {} is unreadable: {e}",
                record.credential_id
            ))
        })?;

        let input = match &self.pepper {
            Some(pepper) => format!("{pepper}{secret}"),
            None => secret.to_string(),
        };
        match self.argon2.verify_password(input.as_bytes(), &stored) {
            Ok(()) => Ok(()),
            Err(HashError::Password) => Err(AuthError::InvalidCredentials),
            Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
        }
    }
}
