//! HTTP error mapping and startup errors.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sso_core::error::{ErrorKind, SsoError};
use sso_core::protocol::ErrorBody;
use sso_db::DbError;

use crate::config::ConfigError;

/// An [`SsoError`] rendered as `{"error": kind, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub SsoError);

impl From<SsoError> for ApiError {
    fn from(err: SsoError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SsoError::Validation {
            message: rejection.body_text(),
        })
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotAuthenticated | ErrorKind::SessionExpired | ErrorKind::SessionNotFound => {
            StatusCode::UNAUTHORIZED
        }
        ErrorKind::DomainNotRegistered => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NetworkError => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let body = if kind == ErrorKind::InternalError {
            // Storage and crypto details stay in the log.
            tracing::error!(error = %self.0, "Request failed");
            ErrorBody {
                error: kind,
                message: "internal error".into(),
            }
        } else {
            ErrorBody::from(&self.0)
        };
        (status_for(kind), Json(body)).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sso(#[from] SsoError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_kinds_are_unauthorized() {
        assert_eq!(status_for(ErrorKind::SessionExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::SessionNotFound), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::DomainNotRegistered), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_errors_hide_details() {
        let resp = ApiError(SsoError::Database("table session locked".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
