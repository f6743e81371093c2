//! Server configuration.

use crate::function::context::DEFAULT_HOSTNAME_VAR;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fallback for timeouts that are unset or unparsable.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the shim server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Environment variable holding the instance hostname.
    pub hostname_var: String,
    /// How long a connection may take to send request headers.
    pub read_timeout: Duration,
    /// How long to drain open connections after a shutdown signal.
    pub shutdown_timeout: Duration,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            hostname_var: DEFAULT_HOSTNAME_VAR.to_string(),
            read_timeout: DEFAULT_TIMEOUT,
            shutdown_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ShimConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `FNSHIM_HOST`, `FNSHIM_PORT`, `read_timeout`
    /// and `write_timeout`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ShimConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("FNSHIM_HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup("FNSHIM_PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config.read_timeout = parse_timeout(lookup("read_timeout").as_deref(), DEFAULT_TIMEOUT);
        config.shutdown_timeout =
            parse_timeout(lookup("write_timeout").as_deref(), DEFAULT_TIMEOUT);

        config
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the hostname variable.
    pub fn hostname_var(mut self, var: impl Into<String>) -> Self {
        self.hostname_var = var.into();
        self
    }

    /// Set the header read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the shutdown drain timeout.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a timeout given as whole seconds (`"30"`) or as a duration
/// string (`"1m30s"`, `"250ms"`). Anything else yields `fallback`.
pub fn parse_timeout(value: Option<&str>, fallback: Duration) -> Duration {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return fallback;
    };

    if let Ok(secs) = value.parse::<u64>() {
        return Duration::from_secs(secs);
    }

    parse_duration(value).unwrap_or(fallback)
}

fn parse_duration(value: &str) -> Option<Duration> {
    let mut total = Duration::ZERO;
    let mut rest = value;

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: f64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 6e10,
            "h" => 3.6e12,
            _ => return None,
        };
        rest = &rest[unit_len..];

        let nanos = amount * nanos_per_unit;
        if !nanos.is_finite() || nanos > u64::MAX as f64 {
            return None;
        }
        total = total.checked_add(Duration::from_nanos(nanos.round() as u64))?;
    }

    Some(total)
}
