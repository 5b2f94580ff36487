use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::session::{Session, SessionId};
use sso_core::repository::SessionRepository;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Concurrent session map. Sessions are immutable after insertion, so
/// the only contended operations are insert and remove, both atomic at
/// the shard level.
#[derive(Clone, Default)]
pub struct MemorySessionRepository {
    inner: Arc<DashMap<SessionId, Session>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Periodically remove expired sessions until the handle is aborted.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        crate::sweeper::spawn_sweeper(self.clone(), every)
    }
}

impl SessionRepository for MemorySessionRepository {
    async fn put(&self, session: Session) -> SsoResult<()> {
        match self.inner.entry(session.session_id.clone()) {
            Entry::Occupied(_) => Err(SsoError::AlreadyExists {
                entity: "session".into(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    async fn get(&self, session_id: &SessionId) -> SsoResult<Session> {
        let now = Utc::now();
        let expired = match self.inner.get(session_id) {
            None => return Err(SsoError::SessionNotFound),
            Some(s) if !s.is_expired_at(now) => return Ok(s.value().clone()),
            Some(_) => true,
        };

        if expired {
            self.inner.remove_if(session_id, |_, s| s.is_expired_at(now));
            debug!(session = %session_id, "Evicted expired session on read");
        }
        Err(SsoError::SessionExpired)
    }

    async fn delete(&self, session_id: &SessionId) -> SsoResult<()> {
        self.inner.remove(session_id);
        Ok(())
    }

    async fn delete_by_principal(&self, principal_id: Uuid) -> SsoResult<u64> {
        let before = self.inner.len();
        self.inner.retain(|_, s| s.principal.id != principal_id);
        Ok(before.saturating_sub(self.inner.len()) as u64)
    }

    async fn cleanup_expired(&self) -> SsoResult<u64> {
        let now = Utc::now();
        let mut removed = 0u64;
        self.inner.retain(|_, s| {
            let keep = !s.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
