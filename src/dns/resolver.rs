//! CNAME-aware forward resolution, reverse lookups and the nslookup report.
//!
//! Resolution is a two-stage strategy. The primary stage ([`Resolver::resolve`])
//! talks to a [`DnsClient`]. When it fails with an infrastructure error,
//! [`Resolver::lookup`] hands the original target to a [`Fallback`] whose raw
//! text is returned instead. Missing records are never errors.

use super::client::{Answers, DnsClient, NameServer, QueryError, RecordData, RecordKind};
use super::fallback::{CommandFallback, Fallback};
use super::hickory::HickoryClient;
use super::report;
use super::target::{is_single_label, is_valid_target, reverse_pointer, strip_root, DnsServer};
use super::{GaiResolver, Name, Resolve};
use crate::base::{context::IoResultExt, neterror::NetError};
use crate::config::DiagConfig;
use serde::Serialize;
use std::{
    fmt, io,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

/// Returned by [`Resolver::resolve_ptr`] when the address has no PTR record.
pub const NO_PTR_RECORD: &str = "No PTR record";
/// Returned by [`Resolver::resolve_ptr`] on any infrastructure failure.
pub const PTR_ERROR: &str = "Error";
pub const INVALID_INPUT: &str = "Invalid input.";

/// Outcome of a forward resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    /// Name actually queried: the target, possibly with the default domain appended.
    pub queried_name: String,
    /// Unique IPv4 literals in first-seen order.
    pub addresses: Vec<String>,
    pub canonical_name: Option<String>,
    pub aliases: Vec<String>,
    pub notes: Option<String>,
}

impl ResolutionResult {
    /// Neither a canonical name nor any address was found.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty() && self.canonical_name.is_none()
    }

    /// Canonical name when there is one, otherwise the queried name.
    pub fn display_name(&self) -> &str {
        self.canonical_name.as_deref().unwrap_or(&self.queried_name)
    }
}

/// Which stage produced a forward lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Resolved(ResolutionResult),
    /// Raw output of the fallback utility.
    Fallback(String),
}

impl LookupOutcome {
    /// Human-readable report for either stage.
    pub fn render(&self) -> String {
        match self {
            LookupOutcome::Resolved(result) => report::render(result),
            LookupOutcome::Fallback(text) => text.clone(),
        }
    }
}

/// Forward and reverse resolution against a caller-selected DNS server.
///
/// Holds only immutable configuration and shared handles, so a single
/// instance serves any number of concurrent requests.
pub struct Resolver {
    client: Arc<dyn DnsClient>,
    host_lookup: Arc<dyn Resolve>,
    fallback: Arc<dyn Fallback>,
    default_domain: Option<String>,
    query_timeout: Duration,
}

impl Resolver {
    /// Production resolver: hickory-dns queries, getaddrinfo for server
    /// hostnames and the configured lookup utility as fallback.
    pub fn new(config: &DiagConfig) -> Self {
        let timeouts = config.timeouts;
        Self::with_parts(
            config,
            Arc::new(HickoryClient::new(timeouts.query).with_pinned(configured_servers(config))),
            Arc::new(GaiResolver::new()),
            Arc::new(CommandFallback::new(
                config.lookup_program.clone(),
                timeouts.fallback,
            )),
        )
    }

    /// Resolver with explicit strategy components.
    pub fn with_parts(
        config: &DiagConfig,
        client: Arc<dyn DnsClient>,
        host_lookup: Arc<dyn Resolve>,
        fallback: Arc<dyn Fallback>,
    ) -> Self {
        Self {
            client,
            host_lookup,
            fallback,
            default_domain: config.default_domain.clone(),
            query_timeout: config.timeouts.query,
        }
    }

    pub fn default_domain(&self) -> Option<&str> {
        self.default_domain.as_deref()
    }

    /// Primary strategy: CNAME then A resolution through the DNS client.
    pub async fn resolve(
        &self,
        target: &str,
        server: &DnsServer,
    ) -> Result<ResolutionResult, NetError> {
        if !is_valid_target(target) {
            return Err(NetError::InvalidInput {
                target: target.to_string(),
            });
        }
        tracing::info!(host = %target, dns_server = %server, "resolving hostname");

        let mut result = ResolutionResult {
            queried_name: target.to_string(),
            ..Default::default()
        };

        if let Some(domain) = self.default_domain.as_deref().filter(|_| is_single_label(target)) {
            let qualified = format!("{target}.{domain}");
            tracing::info!(original = target, qualified = %qualified, "appending default domain to single-label hostname");
            result.notes = Some(format!(
                "Note: Appending {domain} to single-label hostname '{target}'."
            ));
            result.queried_name = qualified;
        }

        let server = self.name_server(server).await?;
        let name = result.queried_name.clone();

        match self.query(&name, RecordKind::Cname, server).await {
            Ok(answers) => {
                let canonical = answers.into_iter().find_map(|record| match record {
                    RecordData::Cname(target) => Some(strip_root(&target).to_string()),
                    _ => None,
                });
                if let Some(canonical) = canonical {
                    result.aliases.push(name.clone());
                    result.canonical_name = Some(canonical);
                }
            }
            Err(QueryError::NoRecords { nx_domain }) => {
                tracing::debug!(domain = %name, nx_domain, "no CNAME record");
            }
            Err(e) => {
                tracing::warn!(domain = %name, error = %e, "CNAME lookup failed, continuing without canonical name");
            }
        }

        let to_resolve = result.canonical_name.clone().unwrap_or(name);
        match self.query(&to_resolve, RecordKind::A, server).await {
            Ok(answers) => {
                for record in answers {
                    if let RecordData::A(ip) = record {
                        let ip = ip.to_string();
                        if !result.addresses.contains(&ip) {
                            result.addresses.push(ip);
                        }
                    }
                }
            }
            Err(QueryError::NoRecords { nx_domain }) => {
                tracing::debug!(domain = %to_resolve, nx_domain, "no A record");
            }
            Err(QueryError::Timeout) => {
                return Err(NetError::QueryTimeout {
                    name: to_resolve,
                    kind: RecordKind::A,
                });
            }
            Err(QueryError::Failed(message)) => {
                return Err(NetError::QueryFailed {
                    name: to_resolve,
                    kind: RecordKind::A,
                    message,
                });
            }
        }

        tracing::debug!(
            domain = %result.queried_name,
            canonical = ?result.canonical_name,
            count = result.addresses.len(),
            "resolution complete"
        );
        Ok(result)
    }

    /// Primary strategy composed with the fallback.
    ///
    /// Caller errors (invalid target, unresolvable server) are returned as
    /// errors; infrastructure failures run the fallback instead.
    pub async fn lookup(&self, target: &str, server: &DnsServer) -> Result<LookupOutcome, NetError> {
        match self.resolve(target, server).await {
            Ok(result) => Ok(LookupOutcome::Resolved(result)),
            Err(e) if e.triggers_fallback() => {
                tracing::warn!(host = %target, dns_server = %server, error = %e, "programmatic lookup failed, using fallback");
                Ok(LookupOutcome::Fallback(self.fallback.run(target, server).await))
            }
            Err(e) => Err(e),
        }
    }

    /// PTR lookup. `Ok(None)` means the address has no PTR record.
    pub async fn lookup_ptr(&self, ip: IpAddr, server: &DnsServer) -> Result<Option<String>, NetError> {
        let server = self.name_server(server).await?;
        let name = reverse_pointer(ip);

        match self.query(&name, RecordKind::Ptr, server).await {
            Ok(answers) => Ok(answers.into_iter().find_map(|record| match record {
                RecordData::Ptr(target) => Some(strip_root(&target).to_string()),
                _ => None,
            })),
            Err(QueryError::NoRecords { nx_domain }) => {
                tracing::debug!(domain = %name, nx_domain, "no PTR record");
                Ok(None)
            }
            Err(QueryError::Timeout) => Err(NetError::QueryTimeout {
                name,
                kind: RecordKind::Ptr,
            }),
            Err(QueryError::Failed(message)) => Err(NetError::QueryFailed {
                name,
                kind: RecordKind::Ptr,
                message,
            }),
        }
    }

    /// Reverse lookup degraded to text: the PTR name, [`NO_PTR_RECORD`] or [`PTR_ERROR`].
    pub async fn resolve_ptr(&self, ip: IpAddr, server: &DnsServer) -> String {
        match self.lookup_ptr(ip, server).await {
            Ok(Some(name)) => name,
            Ok(None) => NO_PTR_RECORD.to_string(),
            Err(e) => {
                tracing::warn!(%ip, error = %e, "reverse lookup failed");
                PTR_ERROR.to_string()
            }
        }
    }

    /// Full nslookup report for a hostname or address literal.
    pub async fn nslookup(&self, target: &str, server: &DnsServer) -> String {
        if !is_valid_target(target) {
            return INVALID_INPUT.to_string();
        }
        tracing::info!(host = %target, dns_server = %server, "running programmatic DNS lookup");

        if let Ok(ip) = target.parse::<IpAddr>() {
            return match self.lookup_ptr(ip, server).await {
                Ok(Some(name)) => report::render_reverse(target, &name),
                Ok(None) => report::render_reverse_missing(target, NO_PTR_RECORD),
                Err(e) => report::render_reverse_missing(target, &e.to_string()),
            };
        }

        match self.lookup(target, server).await {
            Ok(outcome) => outcome.render(),
            Err(e) => report::render_failure(target, &report::error_note(&e)),
        }
    }

    /// Effective nameserver for a caller-selected server.
    ///
    /// Hostnames are resolved through the OS; an IPv4 address is preferred
    /// when the host has both families.
    pub async fn name_server(&self, server: &DnsServer) -> Result<NameServer, NetError> {
        match server {
            DnsServer::SystemDefault => Ok(NameServer::SystemDefault),
            DnsServer::Ip(ip) => Ok(NameServer::Ip(*ip)),
            DnsServer::Hostname(host) => {
                let addrs: Vec<SocketAddr> = self
                    .host_lookup
                    .resolve(Name::new(host.as_str()))
                    .await
                    .map_err(|e| match e {
                        NetError::NameNotResolvedFor { source, .. } => {
                            NetError::DnsServerUnresolvable {
                                server: host.clone(),
                                source,
                            }
                        }
                        other => other,
                    })?
                    .collect();

                let ip = addrs
                    .iter()
                    .find(|addr| addr.is_ipv4())
                    .or_else(|| addrs.first())
                    .map(SocketAddr::ip)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses"))
                    .server_context(host)?;

                tracing::debug!(server = %host, %ip, "resolved DNS server hostname");
                Ok(NameServer::Ip(ip))
            }
        }
    }

    /// One query, bounded by the per-query deadline.
    async fn query(&self, name: &str, kind: RecordKind, server: NameServer) -> Result<Answers, QueryError> {
        let query = self.client.query(Name::new(name), kind, server);
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(domain = name, %kind, "query deadline exceeded");
                Err(QueryError::Timeout)
            }
        }
    }
}

/// Nameservers given as address literals in the configuration.
fn configured_servers(config: &DiagConfig) -> Vec<NameServer> {
    config
        .dns_servers
        .iter()
        .filter_map(|server| match DnsServer::parse(server) {
            DnsServer::Ip(ip) => Some(NameServer::Ip(ip)),
            _ => None,
        })
        .collect()
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("default_domain", &self.default_domain)
            .field("query_timeout", &self.query_timeout)
            .finish_non_exhaustive()
    }
}
