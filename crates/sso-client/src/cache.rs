//! Client-local persisted session record.
//!
//! Holds a single `{ sessionId, expiresAt, storedAt }` record. The master
//! credential and domain tokens are never written here.

use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sso_core::error::{SsoError, SsoResult};
use sso_core::models::session::SessionId;
use tempfile::NamedTempFile;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSession {
    pub session_id: SessionId,
    /// Absent when the broker did not report an expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub stored_at: DateTime<Utc>,
}

impl CachedSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

pub trait SessionCache: Send + Sync {
    fn load(&self) -> SsoResult<Option<CachedSession>>;
    fn store(&self, session: &CachedSession) -> SsoResult<()>;
    fn clear(&self) -> SsoResult<()>;
}

impl<C: SessionCache + ?Sized> SessionCache for Box<C> {
    fn load(&self) -> SsoResult<Option<CachedSession>> {
        (**self).load()
    }

    fn store(&self, session: &CachedSession) -> SsoResult<()> {
        (**self).store(session)
    }

    fn clear(&self) -> SsoResult<()> {
        (**self).clear()
    }
}

/// Process-local cache; nothing survives a restart.
#[derive(Default)]
pub struct MemorySessionCache {
    slot: Mutex<Option<CachedSession>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for MemorySessionCache {
    fn load(&self) -> SsoResult<Option<CachedSession>> {
        Ok(self.slot.lock().clone())
    }

    fn store(&self, session: &CachedSession) -> SsoResult<()> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> SsoResult<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

/// JSON file cache. Writes go through a temporary file in the same
/// directory and an atomic rename, so readers never see a torn record.
pub struct FileSessionCache {
    path: PathBuf,
}

impl FileSessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl SessionCache for FileSessionCache {
    fn load(&self) -> SsoResult<Option<CachedSession>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        match serde_json::from_slice(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable session cache");
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn store(&self, session: &CachedSession) -> SsoResult<()> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;

        let body = serde_json::to_vec(session).map_err(|e| SsoError::Storage(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| storage_error(dir, e))?;
        tmp.write_all(&body).map_err(|e| storage_error(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| storage_error(&self.path, e.error))?;
        Ok(())
    }

    fn clear(&self) -> SsoResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> SsoError {
    SsoError::Storage(format!("{}: {err}", path.display()))
}
