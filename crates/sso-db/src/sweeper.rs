//! Background removal of expired sessions.

use std::time::Duration;

use sso_core::repository::SessionRepository;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Call [`SessionRepository::cleanup_expired`] every `every` until the
/// returned handle is aborted. A failed sweep is logged and retried on
/// the next tick.
pub fn spawn_sweeper<S>(store: S, every: Duration) -> JoinHandle<()>
where
    S: SessionRepository + Clone + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.cleanup_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Swept expired sessions"),
                Err(e) => warn!(error = %e, "Session sweep failed"),
            }
        }
    })
}
