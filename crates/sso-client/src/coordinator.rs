//! Cross-Application Coordinator.
//!
//! An explicit context object holding every session manager that shares a
//! browsing context. Fan-out operations run each member on its own task,
//! wait for all of them and never let one member's failure (or panic)
//! abort the aggregate.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use sso_core::error::SsoResult;
use tracing::{info, warn};

use crate::cache::SessionCache;
use crate::manager::ClientSessionManager;
use crate::transport::SsoTransport;

/// The slice of a session manager the coordinator drives.
#[async_trait]
pub trait ManagedSession: Send + Sync {
    async fn logout(&self) -> SsoResult<()>;
    async fn check_health(&self) -> SsoResult<bool>;
}

#[async_trait]
impl<T, C> ManagedSession for ClientSessionManager<T, C>
where
    T: SsoTransport + 'static,
    C: SessionCache + 'static,
{
    async fn logout(&self) -> SsoResult<()> {
        ClientSessionManager::logout(self).await
    }

    async fn check_health(&self) -> SsoResult<bool> {
        ClientSessionManager::check_health(self).await
    }
}

/// Outcome of [`SessionCoordinator::global_logout`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogoutReport {
    pub succeeded: Vec<String>,
    /// Application name and failure description.
    pub failed: Vec<(String, String)>,
}

impl LogoutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct SessionCoordinator {
    members: Arc<RwLock<BTreeMap<String, Arc<dyn ManagedSession>>>>,
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager under an application name, replacing any
    /// previous registration of that name.
    pub fn register(&self, name: impl Into<String>, member: Arc<dyn ManagedSession>) {
        self.members.write().insert(name.into(), member);
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.members.write().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.members.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn ManagedSession>)> {
        self.members
            .read()
            .iter()
            .map(|(name, m)| (name.clone(), Arc::clone(m)))
            .collect()
    }

    /// Log out every registered manager concurrently.
    pub async fn global_logout(&self) -> LogoutReport {
        let members = self.snapshot();
        let names: Vec<String> = members.iter().map(|(n, _)| n.clone()).collect();
        let tasks = members
            .into_iter()
            .map(|(_, member)| tokio::spawn(async move { member.logout().await }));

        let mut report = LogoutReport::default();
        for (name, outcome) in names.into_iter().zip(join_all(tasks).await) {
            match outcome {
                Ok(Ok(())) => report.succeeded.push(name),
                Ok(Err(e)) => {
                    warn!(application = %name, error = %e, "Logout failed");
                    report.failed.push((name, e.to_string()));
                }
                Err(join_err) => {
                    warn!(application = %name, error = %join_err, "Logout task aborted");
                    report.failed.push((name, join_err.to_string()));
                }
            }
        }
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Global logout finished"
        );
        report
    }

    /// Per-application health. Any failure reads as `false`.
    pub async fn get_global_status(&self) -> BTreeMap<String, bool> {
        let members = self.snapshot();
        let names: Vec<String> = members.iter().map(|(n, _)| n.clone()).collect();
        let tasks = members
            .into_iter()
            .map(|(_, member)| tokio::spawn(async move { member.check_health().await }));

        names
            .into_iter()
            .zip(join_all(tasks).await)
            .map(|(name, outcome)| {
                let healthy = match outcome {
                    Ok(Ok(healthy)) => healthy,
                    Ok(Err(e)) => {
                        warn!(application = %name, error = %e, "Health check failed");
                        false
                    }
                    Err(join_err) => {
                        warn!(application = %name, error = %join_err, "Health check task aborted");
                        false
                    }
                };
                (name, healthy)
            })
            .collect()
    }
}
