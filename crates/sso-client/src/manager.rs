//! Client Session Manager.
//!
//! ```text
//! NoSession --ensure_session--> SessionCached --obtain_domain_token--> TokenObtained
//!                                     ^                                   |
//!                                     +--- one forced re-auth on ---------+
//!                                          session_expired / session_not_found
//! ```
//!
//! The cache lock is held only around local cache reads and writes, never
//! across a broker call, so token requests for different domains proceed
//! concurrently.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::credential::MasterCredential;
use sso_core::models::session::SessionId;
use sso_core::protocol::ValidateResponse;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CachedSession, FileSessionCache, MemorySessionCache, SessionCache};
use crate::config::ClientConfig;
use crate::launch::{LaunchUrl, Launcher};
use crate::transport::{HttpTransport, SsoTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    SessionCached,
    TokenObtained,
}

pub struct ClientSessionManager<T: SsoTransport, C: SessionCache = MemorySessionCache> {
    transport: T,
    cache: C,
    config: ClientConfig,
    credential: RwLock<Option<MasterCredential>>,
    state: RwLock<SessionState>,
    cache_lock: Mutex<()>,
}

impl ClientSessionManager<HttpTransport, Box<dyn SessionCache>> {
    /// HTTP transport plus a file cache when `cache_path` is set, an
    /// in-memory cache otherwise.
    pub fn from_config(config: ClientConfig) -> SsoResult<Self> {
        let transport = HttpTransport::new(&config)?;
        let cache: Box<dyn SessionCache> = match &config.cache_path {
            Some(path) => Box::new(FileSessionCache::new(path)),
            None => Box::new(MemorySessionCache::new()),
        };
        Ok(Self::new(transport, cache, config))
    }
}

impl<T: SsoTransport, C: SessionCache> ClientSessionManager<T, C> {
    pub fn new(transport: T, cache: C, config: ClientConfig) -> Self {
        let manager = Self {
            transport,
            cache,
            config,
            credential: RwLock::new(None),
            state: RwLock::new(SessionState::NoSession),
            cache_lock: Mutex::new(()),
        };
        if manager.cached_session().is_some() {
            *manager.state.write() = SessionState::SessionCached;
        }
        manager
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Hold a master credential in memory. It is never persisted.
    pub fn set_master_credential(&self, credential: MasterCredential) {
        *self.credential.write() = Some(credential);
    }

    pub fn clear_master_credential(&self) {
        *self.credential.write() = None;
    }

    /// The cached session, if present and not expired. An expired record
    /// is cleared.
    pub fn cached_session(&self) -> Option<CachedSession> {
        let _guard = self.cache_lock.lock();
        let cached = match self.cache.load() {
            Ok(c) => c?,
            Err(e) => {
                warn!(error = %e, "Session cache unreadable, treating as empty");
                return None;
            }
        };
        if cached.is_expired_at(Utc::now()) {
            debug!(session = %cached.session_id, "Cached session expired");
            if let Err(e) = self.cache.clear() {
                warn!(error = %e, "Failed to clear expired session cache");
            }
            return None;
        }
        Some(cached)
    }

    pub fn is_authenticated(&self) -> bool {
        self.cached_session().is_some()
    }

    /// Return the cached session, or open a new one with the held master
    /// credential when `force_refresh` is set or nothing is cached.
    ///
    /// Fails with `NotAuthenticated` without contacting the broker when
    /// no master credential is held.
    pub async fn ensure_session(&self, force_refresh: bool) -> SsoResult<CachedSession> {
        if !force_refresh {
            if let Some(cached) = self.cached_session() {
                return Ok(cached);
            }
        }

        let credential = self
            .credential
            .read()
            .clone()
            .ok_or_else(|| SsoError::NotAuthenticated {
                reason: "no master credential available".into(),
            })?;

        let granted = self.transport.authenticate(&credential).await?;
        let record = CachedSession {
            session_id: granted.session_id,
            expires_at: granted.expires_at,
            stored_at: Utc::now(),
        };

        {
            let _guard = self.cache_lock.lock();
            // The session is still usable for this process when persisting fails.
            if let Err(e) = self.cache.store(&record) {
                warn!(error = %e, "Failed to persist session cache");
            }
        }
        *self.state.write() = SessionState::SessionCached;
        info!(session = %record.session_id, forced = force_refresh, "Session established");
        Ok(record)
    }

    /// Obtain a token for `domain`.
    ///
    /// A `session_expired` or `session_not_found` rejection triggers one
    /// forced re-authentication and one retried request. Any other
    /// failure, and any failure of the retry, is returned as is. Network
    /// failures leave the cache untouched.
    pub async fn obtain_domain_token(&self, domain: &str) -> SsoResult<ValidateResponse> {
        let session = self.ensure_session(false).await?;
        match self.transport.request_token(&session.session_id, domain).await {
            Ok(token) => Ok(self.token_obtained(token)),
            Err(e) if e.is_session_invalid() => {
                warn!(
                    session = %session.session_id,
                    domain,
                    kind = %e.kind(),
                    "Session rejected, re-authenticating"
                );
                let refreshed = if self.invalidate(&session.session_id) {
                    self.ensure_session(true).await?
                } else {
                    // Another caller already replaced the session.
                    self.ensure_session(false).await?
                };

                match self.transport.request_token(&refreshed.session_id, domain).await {
                    Ok(token) => Ok(self.token_obtained(token)),
                    Err(e) => {
                        if e.is_session_invalid() {
                            self.invalidate(&refreshed.session_id);
                        }
                        warn!(domain, kind = %e.kind(), "Token request failed after re-authentication");
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Obtain a token for the host of `app_url` and attach it to the URL.
    pub async fn launch_url(&self, app_url: &Url) -> SsoResult<LaunchUrl> {
        let domain = app_url.host_str().ok_or_else(|| SsoError::Validation {
            message: "application URL has no host".into(),
        })?;
        let token = self.obtain_domain_token(domain).await?;
        Ok(LaunchUrl::new(
            app_url.clone(),
            &self.config.launch_param,
            &token.token,
        ))
    }

    pub async fn launch(&self, app_url: &Url, launcher: &impl Launcher) -> SsoResult<()> {
        let url = self.launch_url(app_url).await?;
        info!(application = %app_url.host_str().unwrap_or_default(), "Launching application");
        launcher.open(url)
    }

    /// Drop local session state and the held credential, then end the
    /// session at the broker. Local state is cleared even when the cache
    /// or the broker call fails; a broker failure is reported ahead of a
    /// cache failure.
    pub async fn logout(&self) -> SsoResult<()> {
        self.clear_master_credential();
        *self.state.write() = SessionState::NoSession;

        let (previous, cleared) = {
            let _guard = self.cache_lock.lock();
            let previous = self.cache.load().ok().flatten();
            (previous, self.cache.clear())
        };
        if let Err(e) = &cleared {
            warn!(error = %e, "Failed to clear session cache on logout");
        }

        let ended = match previous {
            Some(cached) => {
                let ended = self.transport.logout(&cached.session_id).await;
                if ended.is_ok() {
                    info!(session = %cached.session_id, "Logged out");
                }
                ended
            }
            None => {
                debug!("Logout with no cached session");
                Ok(())
            }
        };
        ended.and(cleared)
    }

    /// Whether the cached session is still accepted by the broker.
    ///
    /// Without a configured home domain only the local cache is consulted.
    /// The probe never re-authenticates.
    pub async fn check_health(&self) -> SsoResult<bool> {
        let Some(cached) = self.cached_session() else {
            return Ok(false);
        };
        let Some(domain) = self.config.home_domain.as_deref() else {
            return Ok(true);
        };
        match self.transport.request_token(&cached.session_id, domain).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_session_invalid() => {
                self.invalidate(&cached.session_id);
                Ok(false)
            }
            Err(SsoError::NotAuthenticated { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn token_obtained(&self, token: ValidateResponse) -> ValidateResponse {
        *self.state.write() = SessionState::TokenObtained;
        debug!(domain = %token.domain, expires_at = %token.expires_at, "Domain token obtained");
        token
    }

    /// Clear the cache if it still holds `rejected`. Returns `false` when
    /// the cache already holds a different session.
    fn invalidate(&self, rejected: &SessionId) -> bool {
        let _guard = self.cache_lock.lock();
        match self.cache.load() {
            Ok(Some(current)) if current.session_id != *rejected => return false,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Session cache unreadable during invalidation"),
        }
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear session cache");
        }
        *self.state.write() = SessionState::NoSession;
        true
    }
}
