//! Broker HTTP routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use sso_auth::config::AuthConfig;
use sso_auth::issuer::SessionIssuer;
use sso_auth::minter::DomainTokenMinter;
use sso_core::models::credential::MasterCredential;
use sso_core::protocol::{AuthenticateResponse, LogoutRequest, ValidateRequest, ValidateResponse};
use sso_core::repository::{CredentialRepository, DomainRegistryRepository, SessionRepository};

use crate::error::ApiError;

/// Shared handler state. Cheap to clone.
pub struct AppState<C, S, R>
where
    C: CredentialRepository,
    S: SessionRepository,
    R: DomainRegistryRepository,
{
    pub issuer: Arc<SessionIssuer<C, S>>,
    pub minter: Arc<DomainTokenMinter<S, R>>,
}

impl<C, S, R> Clone for AppState<C, S, R>
where
    C: CredentialRepository,
    S: SessionRepository,
    R: DomainRegistryRepository,
{
    fn clone(&self) -> Self {
        Self {
            issuer: Arc::clone(&self.issuer),
            minter: Arc::clone(&self.minter),
        }
    }
}

impl<C, S, R> AppState<C, S, R>
where
    C: CredentialRepository,
    S: SessionRepository + Clone,
    R: DomainRegistryRepository,
{
    pub fn new(credentials: C, sessions: S, registry: R, config: AuthConfig) -> Self {
        Self {
            issuer: Arc::new(SessionIssuer::new(credentials, sessions.clone(), config.clone())),
            minter: Arc::new(DomainTokenMinter::new(sessions, registry, config)),
        }
    }
}

pub fn router<C, S, R>(state: AppState<C, S, R>) -> Router
where
    C: CredentialRepository + 'static,
    S: SessionRepository + 'static,
    R: DomainRegistryRepository + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/sso/authenticate", post(authenticate::<C, S, R>))
        .route("/sso/validate/{domain}", post(validate::<C, S, R>))
        .route("/sso/logout", post(logout::<C, S, R>))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `Authorization: Bearer <credential>`; anything else reads as absent.
fn bearer_credential(headers: &HeaderMap) -> Option<MasterCredential> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let raw = value.strip_prefix("Bearer ")?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(MasterCredential::new(raw))
}

async fn authenticate<C, S, R>(
    State(state): State<AppState<C, S, R>>,
    headers: HeaderMap,
) -> Result<Json<AuthenticateResponse>, ApiError>
where
    C: CredentialRepository,
    S: SessionRepository,
    R: DomainRegistryRepository,
{
    let credential = bearer_credential(&headers);
    let grant = state.issuer.create_session(credential.as_ref()).await?;
    Ok(Json(AuthenticateResponse {
        session_id: grant.session_id,
        expires_at: Some(grant.expires_at),
    }))
}

async fn validate<C, S, R>(
    State(state): State<AppState<C, S, R>>,
    Path(domain): Path<String>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError>
where
    C: CredentialRepository,
    S: SessionRepository,
    R: DomainRegistryRepository,
{
    let Json(request) = body?;
    let token = state
        .minter
        .mint_domain_token(&request.session_id, &domain)
        .await?;
    Ok(Json(token.into()))
}

async fn logout<C, S, R>(
    State(state): State<AppState<C, S, R>>,
    body: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
    C: CredentialRepository,
    S: SessionRepository,
    R: DomainRegistryRepository,
{
    let Json(request) = body?;
    state.issuer.logout(&request.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
