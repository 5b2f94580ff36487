//! Wire payloads for the broker's HTTP interface.
//!
//! `POST /sso/authenticate` carries the master credential in the
//! `Authorization: Bearer` header and answers [`AuthenticateResponse`].
//! `POST /sso/validate/{domain}` takes [`ValidateRequest`] and answers
//! [`ValidateResponse`]. Failures answer [`ErrorBody`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorKind, SsoError};
use crate::models::domain_token::DomainToken;
use crate::models::principal::Role;
use crate::models::session::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub session_id: SessionId,
}

/// Principal claims as exposed to the launching client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalClaims {
    pub id: Uuid,
    pub role: Role,
    pub permissions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub token: String,
    pub domain: String,
    pub application_name: String,
    pub expires_at: DateTime<Utc>,
    pub principal: PrincipalClaims,
}

impl From<DomainToken> for ValidateResponse {
    fn from(t: DomainToken) -> Self {
        Self {
            token: t.token,
            domain: t.domain,
            application_name: t.application_name,
            expires_at: t.expires_at,
            principal: PrincipalClaims {
                id: t.principal_id,
                role: t.role,
                permissions: t.permissions,
                company_id: t.company_id,
            },
        }
    }
}

impl fmt::Debug for ValidateResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateResponse")
            .field("token", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("application_name", &self.application_name)
            .field("expires_at", &self.expires_at)
            .field("principal", &self.principal)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}

impl From<&SsoError> for ErrorBody {
    fn from(err: &SsoError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ErrorBody> for SsoError {
    fn from(body: ErrorBody) -> Self {
        SsoError::from_kind(body.error, body.message)
    }
}
