// packages/core/src/tcpapp/endpoint.rs
//! `<address:port>` command-line endpoints

use crate::utils::errors::{Result, ShimError};
use std::fmt;
use std::str::FromStr;

/// Host and port to connect to or listen on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP literal, without IPv6 brackets
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `(host, port)` pair accepted by tokio's connect/bind
    pub fn as_pair(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn invalid(input: &str, reason: impl Into<String>) -> ShimError {
    ShimError::InvalidEndpoint {
        input: input.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for Endpoint {
    type Err = ShimError;

    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| invalid(s, "expected format <address:port>"))?;

        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(invalid(s, "missing address"));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| invalid(s, format!("invalid port '{}'", port)))?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
