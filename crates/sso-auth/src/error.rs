//! Authentication error types.

use sso_core::error::SsoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no master credential presented")]
    MissingCredential,

    #[error("master credential is malformed")]
    MalformedCredential,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("master credential has been revoked")]
    CredentialRevoked,

    #[error("token has expired")]
    TokenExpired,

    #[error("token is not valid for this domain")]
    DomainMismatch,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for SsoError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential
            | AuthError::MalformedCredential
            | AuthError::InvalidCredentials
            | AuthError::CredentialRevoked
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => SsoError::NotAuthenticated {
                reason: err.to_string(),
            },
            AuthError::DomainMismatch => SsoError::Forbidden {
                reason: err.to_string(),
            },
            AuthError::Config(message) => SsoError::Validation { message },
            AuthError::Crypto(msg) => SsoError::Crypto(msg),
        }
    }
}
