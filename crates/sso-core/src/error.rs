//! Error types for the SSO broker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SsoError {
    #[error("Not authenticated: {reason}")]
    NotAuthenticated { reason: String },

    #[error("Session has expired")]
    SessionExpired,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Domain is not registered: {domain}")]
    DomainNotRegistered { domain: String },

    #[error("Invalid domain: {reason}")]
    InvalidDomain { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SsoResult<T> = Result<T, SsoError>;

impl SsoError {
    /// The machine-readable kind carried on the wire.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SsoError::NotAuthenticated { .. } => ErrorKind::NotAuthenticated,
            SsoError::SessionExpired => ErrorKind::SessionExpired,
            SsoError::SessionNotFound => ErrorKind::SessionNotFound,
            SsoError::DomainNotRegistered { .. } | SsoError::InvalidDomain { .. } => {
                ErrorKind::DomainNotRegistered
            }
            SsoError::Forbidden { .. } => ErrorKind::Forbidden,
            SsoError::Network(_) => ErrorKind::NetworkError,
            SsoError::Validation { .. } => ErrorKind::InvalidRequest,
            SsoError::AlreadyExists { .. }
            | SsoError::NotFound { .. }
            | SsoError::Database(_)
            | SsoError::Crypto(_)
            | SsoError::Storage(_)
            | SsoError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// `true` for the two kinds that a fresh session can recover from.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, SsoError::SessionExpired | SsoError::SessionNotFound)
    }

    /// Rebuild an error from a kind and message received from the broker.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NotAuthenticated => SsoError::NotAuthenticated { reason: message },
            ErrorKind::SessionExpired => SsoError::SessionExpired,
            ErrorKind::SessionNotFound => SsoError::SessionNotFound,
            ErrorKind::DomainNotRegistered => SsoError::DomainNotRegistered { domain: message },
            ErrorKind::Forbidden => SsoError::Forbidden { reason: message },
            ErrorKind::NetworkError => SsoError::Network(message),
            ErrorKind::InvalidRequest => SsoError::Validation { message },
            ErrorKind::InternalError => SsoError::Internal(message),
        }
    }
}

/// Closed set of error kinds exchanged between broker and client.
///
/// Clients decide on recovery from this value alone, never from the
/// human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotAuthenticated,
    SessionExpired,
    SessionNotFound,
    DomainNotRegistered,
    Forbidden,
    NetworkError,
    InvalidRequest,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotAuthenticated => "not_authenticated",
            ErrorKind::SessionExpired => "session_expired",
            ErrorKind::SessionNotFound => "session_not_found",
            ErrorKind::DomainNotRegistered => "domain_not_registered",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = SsoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_authenticated" => Ok(ErrorKind::NotAuthenticated),
            "session_expired" => Ok(ErrorKind::SessionExpired),
            "session_not_found" => Ok(ErrorKind::SessionNotFound),
            "domain_not_registered" => Ok(ErrorKind::DomainNotRegistered),
            "forbidden" => Ok(ErrorKind::Forbidden),
            "network_error" => Ok(ErrorKind::NetworkError),
            "invalid_request" => Ok(ErrorKind::InvalidRequest),
            "internal_error" => Ok(ErrorKind::InternalError),
            other => Err(SsoError::Validation {
                message: format!("unknown error kind: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_session_kinds_are_recoverable() {
        assert!(SsoError::SessionExpired.is_session_invalid());
        assert!(SsoError::SessionNotFound.is_session_invalid());
        assert!(!SsoError::Network("timeout".into()).is_session_invalid());
        assert!(
            !SsoError::NotAuthenticated {
                reason: "x".into()
            }
            .is_session_invalid()
        );
        assert!(
            !SsoError::Forbidden {
                reason: "x".into()
            }
            .is_session_invalid()
        );
    }

    #[test]
    fn invalid_domain_surfaces_as_not_registered() {
        let err = SsoError::InvalidDomain {
            reason: "empty".into(),
        };
        assert_eq!(err.kind(), ErrorKind::DomainNotRegistered);
    }

    #[test]
    fn kind_strings_parse_back() {
        for kind in [
            ErrorKind::NotAuthenticated,
            ErrorKind::SessionExpired,
            ErrorKind::SessionNotFound,
            ErrorKind::DomainNotRegistered,
            ErrorKind::Forbidden,
            ErrorKind::NetworkError,
            ErrorKind::InvalidRequest,
            ErrorKind::InternalError,
        ] {
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn from_kind_rebuilds_session_errors() {
        assert!(matches!(
            SsoError::from_kind(ErrorKind::SessionExpired, "gone"),
            SsoError::SessionExpired
        ));
        assert!(matches!(
            SsoError::from_kind(ErrorKind::SessionNotFound, "gone"),
            SsoError::SessionNotFound
        ));
    }
}
