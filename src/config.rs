//! Diagnostics configuration.
//!
//! [`DiagConfig`] is built once (from defaults or the environment) and shared
//! read-only by every component afterwards.

use crate::dns::DnsServer;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;

/// Errors while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Deadlines for every external interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Single DNS library query.
    pub query: Duration,
    /// Fallback lookup utility.
    pub fallback: Duration,
    pub ping: Duration,
    pub dig: Duration,
    pub traceroute: Duration,
    /// TCP port check connect.
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            query: Duration::from_secs(5),
            fallback: Duration::from_secs(10),
            ping: Duration::from_secs(5),
            dig: Duration::from_secs(10),
            traceroute: Duration::from_secs(30),
            connect: Duration::from_secs(3),
        }
    }
}

/// Configuration options for [`crate::Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagConfig {
    /// DNS servers offered to users; the first one is the default.
    pub dns_servers: Vec<String>,

    /// Suffix appended to single-label hostnames (None = never append).
    pub default_domain: Option<String>,

    /// Host pinged by the status monitor.
    pub status_check_host: String,

    /// How long a status result stays cached.
    pub status_check_interval: Duration,

    /// Where bulk lookup reports are written.
    pub bulk_results_dir: PathBuf,

    /// Utility run when the DNS library fails.
    pub lookup_program: String,

    /// Bulk rows resolved at the same time.
    pub bulk_concurrency: usize,

    pub timeouts: Timeouts,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            dns_servers: ["8.8.8.8", "1.1.1.1", "8.8.4.4", "1.0.0.1"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_domain: None,
            status_check_host: "8.8.8.8".to_string(),
            status_check_interval: Duration::from_secs(300),
            bulk_results_dir: PathBuf::from("bulk_results"),
            lookup_program: "nslookup".to_string(),
            bulk_concurrency: 8,
            timeouts: Timeouts::default(),
        }
    }
}

impl DiagConfig {
    /// Reads configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `CUSTOM_DNS_SERVERS` | `8.8.8.8,1.1.1.1,8.8.4.4,1.0.0.1` |
    /// | `DEFAULT_DOMAIN` | unset |
    /// | `STATUS_CHECK_HOST` | `8.8.8.8` |
    /// | `STATUS_CHECK_INTERVAL` | `300` (seconds) |
    /// | `BULK_RESULTS_DIR` | `bulk_results` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`DiagConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(servers) = lookup("CUSTOM_DNS_SERVERS") {
            let servers: Vec<String> = servers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !servers.is_empty() {
                config.dns_servers = servers;
            }
        }

        config.default_domain = lookup("DEFAULT_DOMAIN")
            .map(|d| d.trim().trim_matches('.').to_string())
            .filter(|d| !d.is_empty());

        if let Some(host) = lookup("STATUS_CHECK_HOST").filter(|h| !h.trim().is_empty()) {
            config.status_check_host = host.trim().to_string();
        }

        if let Some(raw) = lookup("STATUS_CHECK_INTERVAL") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "STATUS_CHECK_INTERVAL",
                value: raw.clone(),
            })?;
            config.status_check_interval = Duration::from_secs(secs);
        }

        if let Some(dir) = lookup("BULK_RESULTS_DIR").filter(|d| !d.trim().is_empty()) {
            config.bulk_results_dir = PathBuf::from(dir);
        }

        tracing::debug!(
            dns_servers = config.dns_servers.len(),
            default_domain = ?config.default_domain,
            status_check_host = %config.status_check_host,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.default_domain = (!domain.is_empty()).then_some(domain);
        self
    }

    pub fn with_dns_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dns_servers = servers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lookup_program(mut self, program: impl Into<String>) -> Self {
        self.lookup_program = program.into();
        self
    }

    pub fn with_status_check(mut self, host: impl Into<String>, interval: Duration) -> Self {
        self.status_check_host = host.into();
        self.status_check_interval = interval;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Server used when the caller does not pick one.
    pub fn primary_dns_server(&self) -> DnsServer {
        self.dns_servers
            .first()
            .map(|s| DnsServer::parse(s))
            .unwrap_or_default()
    }
}
