//! Domain-token signing/verification (EdDSA JWT) and opaque session
//! identifier generation.
//!
//! The audience claim carries the normalized domain, so the binding
//! between a token and its domain is covered by the signature.

use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sso_core::domain::normalize_domain;
use sso_core::models::domain_token::DomainToken;
use sso_core::models::principal::{Principal, Role};
use sso_core::models::registry::DomainRegistryEntry;
use sso_core::models::session::SessionId;
use uuid::Uuid;

use crate::config::{AuthConfig, expiry_after};
use crate::error::AuthError;

/// JWT claims embedded in every domain token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainTokenClaims {
    /// Subject: principal ID (UUID string).
    pub sub: String,
    /// Audience: the normalized domain the token is bound to.
    pub aud: String,
    /// Application name from the registry entry.
    pub app: String,
    pub role: Role,
    pub permissions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub tier: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Sign a domain token for `principal` scoped to `entry.domain`.
///
/// The token expires after the configured lifetime or at `not_after`,
/// whichever comes first.
pub fn issue_domain_token(
    principal: &Principal,
    entry: &DomainRegistryEntry,
    not_after: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<DomainToken, AuthError> {
    let issued_at = Utc::now();
    let expires_at = expiry_after(issued_at, config.domain_token_lifetime_secs)?.min(not_after);

    let claims = DomainTokenClaims {
        sub: principal.id.to_string(),
        aud: entry.domain.clone(),
        app: entry.application_name.clone(),
        role: principal.role,
        permissions: principal.permissions.clone(),
        company_id: principal.company_id.map(|id| id.to_string()),
        tier: principal.subscription_tier.clone(),
        iss: config.jwt_issuer.clone(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode_claims(&claims, config)?;

    Ok(DomainToken {
        token,
        domain: entry.domain.clone(),
        application_name: entry.application_name.clone(),
        principal_id: principal.id,
        role: principal.role,
        permissions: principal.permissions.clone(),
        company_id: principal.company_id,
        issued_at,
        expires_at,
    })
}

pub(crate) fn encode_claims(
    claims: &DomainTokenClaims,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let key = EncodingKey::from_ed_pem(config.jwt_private_key_pem.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("bad private key: {e}")))?;

    jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Verify a domain token as the child application serving
/// `expected_domain` would.
///
/// Checks signature, issuer, expiry and that the token was minted for
/// exactly this domain. Purely local: no call back to the broker.
pub fn verify_domain_token(
    token: &str,
    expected_domain: &str,
    config: &AuthConfig,
) -> Result<DomainTokenClaims, AuthError> {
    let domain = normalize_domain(expected_domain).map_err(|_| AuthError::DomainMismatch)?;

    let key = DecodingKey::from_ed_pem(config.jwt_public_key_pem.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("bad public key: {e}")))?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_audience(&[&domain]);
    validation.set_required_spec_claims(&["sub", "aud", "exp", "iat", "iss"]);
    validation.leeway = config.token_leeway_secs;

    jsonwebtoken::decode::<DomainTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::DomainMismatch,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Generate a session identifier from 32 bytes of OS-seeded randomness
/// (256 bits), base64url-encoded without padding.
pub fn generate_session_id() -> SessionId {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    SessionId::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// SHA-256 hex fingerprint of a master credential.
///
/// This is the value recorded as `Session::source_credential_fingerprint`.
pub fn fingerprint_credential(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
