//! Broker configuration from environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sso_auth::config::{AuthConfig, MAX_LIFETIME_SECS};
use sso_db::DbConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Surreal,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "surreal" => Ok(Self::Surreal),
            other => Err(format!("expected `memory` or `surreal`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub sweep_interval: Duration,
    /// JSON array of domain registry entries loaded at startup.
    pub registry_path: Option<PathBuf>,
    /// JSON array of master credential records loaded at startup.
    pub credentials_path: Option<PathBuf>,
    pub store: StoreKind,
    pub db: DbConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_private_key_pem: read_file(required(&lookup, "SSO_JWT_PRIVATE_KEY_PATH")?)?,
            jwt_public_key_pem: read_file(required(&lookup, "SSO_JWT_PUBLIC_KEY_PATH")?)?,
            jwt_issuer: lookup("SSO_JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            session_lifetime_secs: parsed(&lookup, "SSO_SESSION_TTL_SECS")?
                .unwrap_or(defaults.session_lifetime_secs),
            domain_token_lifetime_secs: parsed(&lookup, "SSO_TOKEN_TTL_SECS")?
                .unwrap_or(defaults.domain_token_lifetime_secs),
            token_leeway_secs: parsed(&lookup, "SSO_TOKEN_LEEWAY_SECS")?
                .unwrap_or(defaults.token_leeway_secs),
            pepper: lookup("SSO_CREDENTIAL_PEPPER"),
        };
        auth.validate().map_err(|e| ConfigError::Invalid {
            var: if (1..=MAX_LIFETIME_SECS).contains(&auth.session_lifetime_secs) {
                "SSO_TOKEN_TTL_SECS"
            } else {
                "SSO_SESSION_TTL_SECS"
            },
            reason: e.to_string(),
        })?;

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: lookup("SSO_DB_URL").unwrap_or(db_defaults.url),
            namespace: lookup("SSO_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: lookup("SSO_DB_DATABASE").unwrap_or(db_defaults.database),
            username: lookup("SSO_DB_USERNAME").unwrap_or(db_defaults.username),
            password: lookup("SSO_DB_PASSWORD").unwrap_or(db_defaults.password),
        };

        let sweep_secs: u64 = parsed(&lookup, "SSO_SWEEP_INTERVAL_SECS")?.unwrap_or(60);
        if sweep_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SSO_SWEEP_INTERVAL_SECS",
                reason: "must be positive".into(),
            });
        }

        Ok(Self {
            bind_addr: parsed(&lookup, "SSO_BIND_ADDR")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080))),
            auth,
            sweep_interval: Duration::from_secs(sweep_secs),
            registry_path: lookup("SSO_REGISTRY_PATH").map(PathBuf::from),
            credentials_path: lookup("SSO_CREDENTIALS_PATH").map(PathBuf::from),
            store: parsed(&lookup, "SSO_STORE")?.unwrap_or(StoreKind::Memory),
            db,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    lookup(var).ok_or(ConfigError::Missing(var))
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn read_file(path: String) -> Result<String, ConfigError> {
    let path = PathBuf::from(path);
    std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })
}

/// Read a JSON document from `path`.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
