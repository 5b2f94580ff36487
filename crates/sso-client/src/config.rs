//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the broker, e.g. `https://platform.example.com/`.
    pub broker_url: Url,
    /// Bound on every broker request (default: 10 seconds).
    pub request_timeout: Duration,
    /// Where the session cache is persisted; `None` keeps it in memory.
    pub cache_path: Option<PathBuf>,
    /// Query parameter carrying the token in a launch URL.
    pub launch_param: String,
    /// Domain probed by health checks. `None` limits health checks to
    /// the local cache.
    pub home_domain: Option<String>,
}

impl ClientConfig {
    pub fn new(broker_url: Url) -> Self {
        Self {
            broker_url,
            request_timeout: Duration::from_secs(10),
            cache_path: None,
            launch_param: "sso_token".into(),
            home_domain: None,
        }
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_home_domain(mut self, domain: impl Into<String>) -> Self {
        self.home_domain = Some(domain.into());
        self
    }

    pub fn with_launch_param(mut self, param: impl Into<String>) -> Self {
        self.launch_param = param.into();
        self
    }
}
