//! Launching a child application with its domain token attached.

use std::fmt;

use sso_core::error::SsoResult;
use url::Url;

/// Application URL carrying a domain token in its query string.
///
/// `Display` and `Debug` replace the token with `[REDACTED]`; only
/// [`LaunchUrl::expose`] yields the navigable URL.
#[derive(Clone)]
pub struct LaunchUrl {
    url: Url,
    param: String,
}

impl LaunchUrl {
    pub(crate) fn new(mut app_url: Url, param: &str, token: &str) -> Self {
        app_url.query_pairs_mut().append_pair(param, token);
        Self {
            url: app_url,
            param: param.to_string(),
        }
    }

    pub fn expose(&self) -> &Url {
        &self.url
    }

    pub fn into_url(self) -> Url {
        self.url
    }

    fn redacted(&self) -> Url {
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == self.param.as_str() {
                    "[REDACTED]".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        let mut url = self.url.clone();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url
    }
}

impl fmt::Display for LaunchUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl fmt::Debug for LaunchUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LaunchUrl({})", self.redacted())
    }
}

/// Opens a launch URL (a browser, a webview, a redirect response).
///
/// Implementations must not log or persist the URL.
pub trait Launcher: Send + Sync {
    fn open(&self, url: LaunchUrl) -> SsoResult<()>;
}
