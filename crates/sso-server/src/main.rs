//! SSO broker entry point.

use sso_server::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sso_server=info,sso_auth=info,sso_db=info")),
        )
        .json()
        .init();

    tracing::info!("Starting SSO broker...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };

    if let Err(e) = sso_server::run(config).await {
        tracing::error!(error = %e, "SSO broker failed");
        std::process::exit(1);
    }
}
