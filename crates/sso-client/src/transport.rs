//! Network boundary between a client and the broker.

use std::future::Future;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::credential::MasterCredential;
use sso_core::models::session::SessionId;
use sso_core::protocol::{
    AuthenticateResponse, ErrorBody, LogoutRequest, ValidateRequest, ValidateResponse,
};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;

/// The broker operations a client depends on.
///
/// Implementations report failures with the error kind the broker
/// returned; transport-level failures are always [`SsoError::Network`].
pub trait SsoTransport: Send + Sync {
    fn authenticate(
        &self,
        credential: &MasterCredential,
    ) -> impl Future<Output = SsoResult<AuthenticateResponse>> + Send;

    fn request_token(
        &self,
        session_id: &SessionId,
        domain: &str,
    ) -> impl Future<Output = SsoResult<ValidateResponse>> + Send;

    fn logout(&self, session_id: &SessionId) -> impl Future<Output = SsoResult<()>> + Send;
}

/// JSON-over-HTTP transport.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> SsoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SsoError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base: config.broker_url.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> SsoResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SsoError::Validation {
                message: format!("broker URL cannot be a base: {}", self.base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl SsoTransport for HttpTransport {
    async fn authenticate(&self, credential: &MasterCredential) -> SsoResult<AuthenticateResponse> {
        let url = self.endpoint(&["sso", "authenticate"])?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(network_error)?;
        decode(resp).await
    }

    async fn request_token(
        &self,
        session_id: &SessionId,
        domain: &str,
    ) -> SsoResult<ValidateResponse> {
        let url = self.endpoint(&["sso", "validate", domain])?;
        debug!(session = %session_id, domain, "Requesting domain token");
        let resp = self
            .http
            .post(url)
            .json(&ValidateRequest {
                session_id: session_id.clone(),
            })
            .send()
            .await
            .map_err(network_error)?;
        decode(resp).await
    }

    async fn logout(&self, session_id: &SessionId) -> SsoResult<()> {
        let url = self.endpoint(&["sso", "logout"])?;
        let resp = self
            .http
            .post(url)
            .json(&LogoutRequest {
                session_id: session_id.clone(),
            })
            .send()
            .await
            .map_err(network_error)?;
        check_status(resp).await.map(|_| ())
    }
}

fn network_error(err: reqwest::Error) -> SsoError {
    SsoError::Network(err.without_url().to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> SsoResult<T> {
    let resp = check_status(resp).await?;
    resp.json::<T>()
        .await
        .map_err(|e| SsoError::Internal(format!("malformed broker response: {e}")))
}

/// Map a non-success response onto the error taxonomy.
///
/// Server errors are transient and never read as session invalidity.
/// Client errors carry an [`ErrorBody`] whose kind is authoritative.
async fn check_status(resp: Response) -> SsoResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status.is_server_error() {
        return Err(SsoError::Network(format!("broker returned {status}")));
    }

    let body = resp.bytes().await.map_err(network_error)?;
    match serde_json::from_slice::<ErrorBody>(&body) {
        Ok(body) => Err(body.into()),
        Err(_) if status == StatusCode::UNAUTHORIZED => Err(SsoError::NotAuthenticated {
            reason: "broker rejected the request".into(),
        }),
        Err(_) => Err(SsoError::Internal(format!(
            "unexpected broker response {status}"
        ))),
    }
}
