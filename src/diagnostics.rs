//! Diagnostics facade.
//!
//! [`Diagnostics`] is the context a web layer holds for the lifetime of the
//! process: it owns the immutable configuration, the shared resolver and the
//! status cache, and maps [`ToolRequest`] payloads onto the tools.

use crate::config::DiagConfig;
use crate::dns::{is_valid_target, report, DnsServer, Resolver};
use crate::tools::{
    bulk::{BulkLookup, BulkOptions, BulkReport},
    dig::run_dig,
    netconn::{parse_port, run_test_netconnection, INVALID_PORT},
    ping::Pinger,
    status::{StatusMonitor, StatusSnapshot},
    traceroute::run_traceroute,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub const TARGET_REQUIRED: &str = "Target parameter required";
pub const INVALID_TARGET_FORMAT: &str = "Invalid target format";
pub const PING_SKIPPED: &str = "Ping skipped (No IP found).";
/// Echo requests sent after a successful nslookup.
pub const NSLOOKUP_PING_COUNT: u32 = 4;

fn default_count() -> u32 {
    4
}

fn default_record_type() -> String {
    "A".to_string()
}

fn default_port() -> u32 {
    443
}

fn default_protocol() -> String {
    "tcp".to_string()
}

/// A tool invocation as received over JSON, tagged by `"tool"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum ToolRequest {
    Nslookup {
        #[serde(default)]
        target: String,
        /// Defaults to the first configured server.
        #[serde(default)]
        dns_server: Option<String>,
    },
    Ping {
        #[serde(default)]
        target: String,
        #[serde(default = "default_count")]
        count: u32,
    },
    Dig {
        #[serde(default)]
        target: String,
        #[serde(rename = "type", default = "default_record_type")]
        record_type: String,
        /// Defaults to the system resolver.
        #[serde(default)]
        dns_server: Option<String>,
    },
    Traceroute {
        #[serde(default)]
        target: String,
    },
    Netconnection {
        #[serde(default)]
        target: String,
        #[serde(default = "default_port")]
        port: u32,
        #[serde(default = "default_protocol")]
        protocol: String,
    },
}

impl ToolRequest {
    pub fn target(&self) -> &str {
        match self {
            ToolRequest::Nslookup { target, .. }
            | ToolRequest::Ping { target, .. }
            | ToolRequest::Dig { target, .. }
            | ToolRequest::Traceroute { target }
            | ToolRequest::Netconnection { target, .. } => target,
        }
    }
}

/// JSON answer to a [`ToolRequest`]. Only the fields relevant to the tool are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    fn ok(target: &str, result: String) -> Self {
        Self {
            success: true,
            target: Some(target.to_string()),
            result: Some(result),
            timestamp: Some(utc_timestamp()),
            ..Default::default()
        }
    }
}

/// Current UTC time as RFC 3339 with a `Z` suffix.
pub fn utc_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}

/// Shared diagnostics context.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    config: Arc<DiagConfig>,
    resolver: Arc<Resolver>,
    pinger: Arc<Pinger>,
    status: StatusMonitor,
    bulk: BulkLookup,
}

impl Diagnostics {
    pub fn new(config: DiagConfig) -> Self {
        let resolver = Resolver::new(&config);
        Self::with_resolver(config, resolver)
    }

    /// Context around a custom resolver.
    pub fn with_resolver(config: DiagConfig, resolver: Resolver) -> Self {
        let resolver = Arc::new(resolver);
        let pinger = Pinger::new(
            resolver.clone(),
            config.primary_dns_server(),
            config.timeouts.ping,
        );
        Self::assemble(Arc::new(config), resolver, pinger)
    }

    /// Replaces the `ping` executable used by every tool.
    pub fn with_ping_program(self, program: impl Into<String>) -> Self {
        let pinger = Pinger::new(
            self.resolver.clone(),
            self.config.primary_dns_server(),
            self.config.timeouts.ping,
        )
        .with_program(program);
        Self::assemble(self.config, self.resolver, pinger)
    }

    fn assemble(config: Arc<DiagConfig>, resolver: Arc<Resolver>, pinger: Pinger) -> Self {
        let pinger = Arc::new(pinger);
        let status = StatusMonitor::new(
            config.status_check_host.clone(),
            config.status_check_interval,
            pinger.clone(),
        );
        let bulk = BulkLookup::new(resolver.clone(), pinger.clone(), config.bulk_concurrency);
        Self {
            config,
            resolver,
            pinger,
            status,
            bulk,
        }
    }

    pub fn config(&self) -> &DiagConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn status_monitor(&self) -> &StatusMonitor {
        &self.status
    }

    /// `None` selects the first configured server.
    fn server_or_primary(&self, server: Option<&str>) -> DnsServer {
        match server {
            Some(s) => DnsServer::parse(s),
            None => self.config.primary_dns_server(),
        }
    }

    pub async fn nslookup(&self, target: &str, server: Option<&str>) -> String {
        let server = self.server_or_primary(server);
        self.resolver.nslookup(target.trim(), &server).await
    }

    /// nslookup, then [`NSLOOKUP_PING_COUNT`] pings of the first address found.
    pub async fn nslookup_then_ping(&self, target: &str, server: Option<&str>) -> String {
        let lookup = self.nslookup(target, server).await;
        match report::extract_addresses(&lookup).first() {
            Some(ip) => {
                let ping = self.pinger.ping(ip, NSLOOKUP_PING_COUNT).await;
                format!("{lookup}\n\n--- Ping Result for {ip} ---\n{ping}")
            }
            None => format!("{lookup}\n\n{PING_SKIPPED}"),
        }
    }

    pub async fn ping(&self, target: &str, count: u32) -> String {
        self.pinger.ping(target.trim(), count).await
    }

    pub async fn dig(&self, target: &str, record_type: &str, server: Option<&str>) -> String {
        let server = DnsServer::from(server);
        run_dig(target.trim(), record_type, &server, self.config.timeouts.dig).await
    }

    pub async fn traceroute(&self, target: &str) -> String {
        run_traceroute(target.trim(), self.config.timeouts.traceroute).await
    }

    /// Port check; `port` is the raw user input.
    pub async fn net_connection(&self, target: &str, port: &str, protocol: &str) -> String {
        match parse_port(port) {
            Ok(port) => {
                run_test_netconnection(target.trim(), port, protocol, self.config.timeouts.connect)
                    .await
            }
            Err(_) => INVALID_PORT.to_string(),
        }
    }

    /// Bulk lookup over uploaded content.
    pub async fn bulk(&self, content: &str, options: &BulkOptions) -> BulkReport {
        self.bulk.run(content, options).await
    }

    /// Bulk lookup written to the configured results directory.
    pub async fn bulk_to_file(
        &self,
        content: &str,
        options: &BulkOptions,
    ) -> std::io::Result<(BulkReport, std::path::PathBuf)> {
        let report = self.bulk(content, options).await;
        let path = report.persist(&self.config.bulk_results_dir).await?;
        Ok((report, path))
    }

    /// Cached reachability of the status check host.
    pub async fn dns_status(&self) -> StatusSnapshot {
        self.status.status().await
    }

    /// Runs a JSON tool request.
    pub async fn execute(&self, request: ToolRequest) -> ToolResponse {
        let target = request.target().trim().to_string();
        if target.is_empty() {
            return ToolResponse::error(TARGET_REQUIRED);
        }
        if !is_valid_target(&target) {
            return ToolResponse::error(INVALID_TARGET_FORMAT);
        }
        tracing::debug!(host = %target, ?request, "executing tool request");

        match request {
            ToolRequest::Nslookup { dns_server, .. } => {
                let server = self.server_or_primary(dns_server.as_deref());
                let result = self.resolver.nslookup(&target, &server).await;
                ToolResponse {
                    dns_server: Some(server.to_string()),
                    ..ToolResponse::ok(&target, result)
                }
            }
            ToolRequest::Ping { count, .. } => {
                let result = self.pinger.ping(&target, count).await;
                ToolResponse {
                    count: Some(count),
                    ..ToolResponse::ok(&target, result)
                }
            }
            ToolRequest::Dig {
                record_type,
                dns_server,
                ..
            } => {
                let record_type = record_type.trim().to_ascii_uppercase();
                let server = DnsServer::from(dns_server.as_deref());
                let result = run_dig(&target, &record_type, &server, self.config.timeouts.dig).await;
                ToolResponse {
                    record_type: Some(record_type),
                    dns_server: Some(server.to_string()),
                    ..ToolResponse::ok(&target, result)
                }
            }
            ToolRequest::Traceroute { .. } => {
                let result = run_traceroute(&target, self.config.timeouts.traceroute).await;
                ToolResponse::ok(&target, result)
            }
            ToolRequest::Netconnection { port, protocol, .. } => {
                let protocol = protocol.to_ascii_lowercase();
                let result = match u16::try_from(port).ok().filter(|p| *p > 0) {
                    Some(p) => {
                        run_test_netconnection(&target, p, &protocol, self.config.timeouts.connect)
                            .await
                    }
                    None => INVALID_PORT.to_string(),
                };
                ToolResponse {
                    port: Some(port),
                    protocol: Some(protocol),
                    ..ToolResponse::ok(&target, result)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: ToolRequest = serde_json::from_str(r#"{"tool":"ping","target":"example.com"}"#).unwrap();
        assert_eq!(
            req,
            ToolRequest::Ping {
                target: "example.com".into(),
                count: 4
            }
        );

        let req: ToolRequest = serde_json::from_str(r#"{"tool":"dig","target":"example.com"}"#).unwrap();
        assert_eq!(
            req,
            ToolRequest::Dig {
                target: "example.com".into(),
                record_type: "A".into(),
                dns_server: None
            }
        );

        let req: ToolRequest = serde_json::from_str(r#"{"tool":"netconnection","target":"h"}"#).unwrap();
        assert_eq!(
            req,
            ToolRequest::Netconnection {
                target: "h".into(),
                port: 443,
                protocol: "tcp".into()
            }
        );
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ToolResponse::error(TARGET_REQUIRED)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Target parameter required"})
        );
    }

    #[test]
    fn test_timestamp_is_utc() {
        let ts = utc_timestamp();
        assert!(ts.ends_with('Z'), "{ts}");
        assert!(OffsetDateTime::parse(&ts, &Rfc3339).is_ok());
    }
}
