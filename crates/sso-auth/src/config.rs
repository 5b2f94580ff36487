//! Authentication configuration.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::AuthError;

/// Longest session or domain-token lifetime accepted (30 days).
pub const MAX_LIFETIME_SECS: u64 = 30 * 24 * 60 * 60;

/// Configuration for session issuance and token minting.
#[derive(Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for domain-token signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for domain-token verification.
    pub jwt_public_key_pem: String,
    /// Token issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Session lifetime in seconds (default: 28_800 = 8 hours).
    pub session_lifetime_secs: u64,
    /// Domain token lifetime in seconds (default: 300 = 5 minutes).
    /// Also the upper bound on how stale token claims can be.
    pub domain_token_lifetime_secs: u64,
    /// Clock skew tolerated when verifying `exp` (default: 30).
    pub token_leeway_secs: u64,
    /// Optional pepper prepended to credential secrets before Argon2id
    /// verification.
    pub pepper: Option<String>,
}

impl AuthConfig {
    /// Reject lifetimes that would let a URL-borne token outlive or
    /// match the session it was minted from.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.session_lifetime_secs == 0 {
            return Err(AuthError::Config("session lifetime must be positive".into()));
        }
        if self.domain_token_lifetime_secs == 0 {
            return Err(AuthError::Config(
                "domain token lifetime must be positive".into(),
            ));
        }
        if self.session_lifetime_secs > MAX_LIFETIME_SECS {
            return Err(AuthError::Config(format!(
                "session lifetime ({}s) exceeds the maximum of {MAX_LIFETIME_SECS}s",
                self.session_lifetime_secs
            )));
        }
        if self.domain_token_lifetime_secs >= self.session_lifetime_secs {
            return Err(AuthError::Config(format!(
                "domain token lifetime ({}s) must be shorter than session lifetime ({}s)",
                self.domain_token_lifetime_secs, self.session_lifetime_secs
            )));
        }
        Ok(())
    }
}

/// `start` plus `secs` seconds, or a config error when the sum does not
/// fit a timestamp.
pub(crate) fn expiry_after(start: DateTime<Utc>, secs: u64) -> Result<DateTime<Utc>, AuthError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| start.checked_add_signed(lifetime))
        .ok_or_else(|| AuthError::Config(format!("lifetime of {secs}s is out of range")))
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_issuer: "sso-broker".into(),
            session_lifetime_secs: 28_800,
            domain_token_lifetime_secs: 300,
            token_leeway_secs: 30,
            pepper: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_private_key_pem", &"[REDACTED]")
            .field("jwt_public_key_pem", &self.jwt_public_key_pem)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("session_lifetime_secs", &self.session_lifetime_secs)
            .field("domain_token_lifetime_secs", &self.domain_token_lifetime_secs)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
