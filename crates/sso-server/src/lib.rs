//! SSO Server: HTTP broker for session authentication and domain-token
//! minting.
//!
//! Wires configuration, stores and routes together. The binary in
//! `main.rs` only sets up logging and calls [`run`].

pub mod config;
pub mod error;
pub mod routes;

use sso_core::models::credential::MasterCredentialRecord;
use sso_core::models::registry::DomainRegistryEntry;
use sso_core::repository::{CredentialRepository, DomainRegistryRepository, SessionRepository};
use sso_db::DbManager;
use sso_db::memory::{MemoryCredentialRepository, MemoryDomainRegistry, MemorySessionRepository};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{ServerConfig, StoreKind, load_json};
use crate::routes::{AppState, router};

pub use config::ConfigError;
pub use error::{ApiError, ServerError};

/// Load seed data, build the configured stores and serve until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let entries: Vec<DomainRegistryEntry> = match &config.registry_path {
        Some(path) => load_json(path)?,
        None => {
            warn!("SSO_REGISTRY_PATH not set, every domain is unregistered");
            Vec::new()
        }
    };
    let records: Vec<MasterCredentialRecord> = match &config.credentials_path {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    info!(
        domains = entries.len(),
        credentials = records.len(),
        store = ?config.store,
        "Loaded seed data"
    );

    match config.store {
        StoreKind::Memory => {
            let registry = MemoryDomainRegistry::from_entries(entries)?;
            let credentials =
                MemoryCredentialRepository::from_records(records, config.auth.pepper.clone());
            serve(&config, credentials, MemorySessionRepository::new(), registry).await
        }
        StoreKind::Surreal => {
            let db = DbManager::connect(&config.db).await?;
            let registry = db.registry();
            for entry in entries {
                registry.upsert(entry).await?;
            }
            let credentials = db.credentials(config.auth.pepper.clone());
            for record in records {
                credentials.import(record).await?;
            }
            serve(&config, credentials, db.sessions(), registry).await
        }
    }
}

async fn serve<C, S, R>(
    config: &ServerConfig,
    credentials: C,
    sessions: S,
    registry: R,
) -> Result<(), ServerError>
where
    C: CredentialRepository + 'static,
    S: SessionRepository + Clone + 'static,
    R: DomainRegistryRepository + 'static,
{
    let sweeper = sso_db::spawn_sweeper(sessions.clone(), config.sweep_interval);
    let app = router(AppState::new(
        credentials,
        sessions,
        registry,
        config.auth.clone(),
    ));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        sweep_interval = ?config.sweep_interval,
        "SSO broker listening"
    );
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    info!("SSO broker stopped");
    served.map_err(ServerError::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, serve until the process is killed.
        std::future::pending::<()>().await;
    }
}
