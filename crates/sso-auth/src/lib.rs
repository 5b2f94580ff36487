//! SSO Auth: master-credential validation, session issuance and
//! domain-scoped token minting/verification.

pub mod config;
pub mod credential;
pub mod error;
pub mod issuer;
pub mod minter;
pub mod token;

pub use config::AuthConfig;
pub use credential::CredentialVerifier;
pub use error::AuthError;
pub use issuer::{SessionGrant, SessionIssuer};
pub use minter::DomainTokenMinter;
pub use token::{DomainTokenClaims, verify_domain_token};
