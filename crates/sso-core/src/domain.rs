//! Hostname normalization shared by the registry, the minter and the
//! client.
//!
//! Normalization case-folds the host and drops scheme, userinfo, port,
//! path and a trailing root dot, so `HTTPS://Apps.Example.com:8443/x`
//! and `apps.example.com` address the same registry entry.

use url::{Host, Url};

use crate::error::{SsoError, SsoResult};

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Normalize a domain or URL into the registry lookup key.
pub fn normalize_domain(input: &str) -> SsoResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("domain is empty"));
    }

    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{trimmed}"))
    }
    .map_err(|e| invalid(&format!("unparseable domain '{trimmed}': {e}")))?;

    match url.host() {
        Some(Host::Domain(host)) => {
            let host = host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase();
            validate_hostname(&host)?;
            Ok(host)
        }
        Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
        Some(Host::Ipv6(addr)) => Ok(format!("[{addr}]")),
        None => Err(invalid(&format!("no host in '{trimmed}'"))),
    }
}

fn validate_hostname(host: &str) -> SsoResult<()> {
    if host.is_empty() || host.len() > MAX_DOMAIN_LEN {
        return Err(invalid("domain length out of range"));
    }
    for label in host.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(invalid(&format!("bad label in '{host}'")));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid(&format!("label may not start or end with '-' in '{host}'")));
        }
        if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(invalid(&format!("illegal character in '{host}'")));
        }
    }
    Ok(())
}

fn invalid(reason: &str) -> SsoError {
    SsoError::InvalidDomain {
        reason: reason.to_string(),
    }
}
