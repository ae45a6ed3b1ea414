//! Scan targets and one-shot host resolution.
//!
//! A target is resolved exactly once, before any probe is sent. Literal
//! addresses skip DNS entirely; hostnames are syntax-checked first so obviously
//! bad input never reaches the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A host together with the address it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The host as given by the caller (hostname or literal address).
    pub host: String,
    /// The address every probe of this scan connects to.
    pub address: IpAddr,
}

/// Failure to turn a host string into an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("invalid host '{0}'")]
    InvalidHost(String),
    #[error("failed to resolve hostname '{host}': {reason}")]
    LookupFailed { host: String, reason: String },
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddresses(String),
}

impl ScanTarget {
    pub fn new(host: impl Into<String>, address: IpAddr) -> Self {
        Self {
            host: host.into(),
            address,
        }
    }

    /// Resolve `host` to a single address.
    ///
    /// Literal IPv4/IPv6 addresses (optionally bracketed) are used as-is.
    /// Hostnames are looked up with the system resolver configuration and the
    /// first returned address wins.
    pub async fn resolve(host: &str) -> Result<Self, ResolutionError> {
        let host = host.trim();

        if let Some(ip) = parse_literal(host) {
            return Ok(Self::new(host, ip));
        }

        if !is_valid_hostname(host) {
            return Err(ResolutionError::InvalidHost(host.to_string()));
        }

        let resolver = system_resolver();
        let response = resolver
            .lookup_ip(host)
            .await
            .map_err(|e| ResolutionError::LookupFailed {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        let address = response
            .iter()
            .next()
            .ok_or_else(|| ResolutionError::NoAddresses(host.to_string()))?;

        debug!(%host, %address, "resolved target");
        Ok(Self::new(host, address))
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if parse_literal(&self.host) == Some(self.address) {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} ({})", self.host, self.address)
        }
    }
}

fn parse_literal(host: &str) -> Option<IpAddr> {
    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    unbracketed.parse().ok()
}

fn system_resolver() -> TokioAsyncResolver {
    TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        debug!(error = %e, "system resolver config unavailable, using defaults");
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    })
}

/// RFC 1123 hostname syntax: dot-separated labels of 1-63 alphanumerics or
/// hyphens, not starting or ending with a hyphen, 253 characters total.
fn is_valid_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
