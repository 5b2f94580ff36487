//! Credential generation and hashing helpers shared by every store.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use rand::Rng;
use sha2::{Digest, Sha256};
use sso_core::models::session::SessionId;

use crate::error::DbError;

/// Generate a credential ID (`mc_` + 32 hex chars) and a secret
/// (64 hex chars = 32 bytes of entropy).
pub fn generate_credential() -> (String, String) {
    let mut rng = rand::rng();
    let id: [u8; 16] = rng.random();
    let secret: [u8; 32] = rng.random();
    (format!("mc_{}", hex::encode(id)), hex::encode(secret))
}

/// Hash a credential secret with Argon2id (PHC string). The optional
/// pepper is prepended before hashing.
pub fn hash_secret(secret: &str, pepper: Option<&str>) -> Result<String, DbError> {
    let input = match pepper {
        Some(p) => format!("{p}{secret}"),
        None => secret.to_string(),
    };
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(input.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbError::Hash(e.to_string()))
}

/// Storage key for a session: SHA-256 hex of the identifier, so a dump
/// of the session table cannot be replayed.
pub fn session_key(session_id: &SessionId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
