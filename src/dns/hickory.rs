//! DNS client backed by hickory-dns.
//!
//! Pinned nameservers (the system entry plus any configured servers) get one
//! hickory resolver each, built on first use and kept in a pool. Any other
//! server gets a short-lived resolver for the single query, so caller-chosen
//! servers never grow the pool. The system entry reads the
//! host configuration (`/etc/resolv.conf` or the platform equivalent). Explicit
//! servers get a single plain UDP/TCP nameserver on port 53.

use super::client::{Answers, DnsClient, NameServer, QueryError, Querying, RecordData, RecordKind};
use super::Name;
use dashmap::DashMap;
use hickory_resolver::{
    config::{NameServerConfigGroup, ResolverConfig},
    name_server::TokioConnectionProvider,
    proto::{
        rr::{RData, RecordType},
        ProtoErrorKind,
    },
    ResolveError, ResolveErrorKind, TokioResolver,
};
use std::{collections::HashSet, fmt, sync::Arc, time::Duration};

/// Async DNS client backed by hickory-dns.
///
/// Cloning is cheap; clones share the resolver pool and the pinned set.
///
/// # Example
///
/// ```rust,ignore
/// use netdiag::dns::{DnsClient, HickoryClient, Name, NameServer, RecordKind};
///
/// let client = HickoryClient::new(Duration::from_secs(5));
/// let answers = client
///     .query(Name::new("example.com"), RecordKind::A, NameServer::SystemDefault)
///     .await?;
/// ```
#[derive(Clone)]
pub struct HickoryClient {
    pool: Arc<DashMap<NameServer, TokioResolver>>,
    pinned: Arc<HashSet<NameServer>>,
    timeout: Duration,
}

impl HickoryClient {
    /// Creates a client whose resolvers give up after `timeout`, with a single attempt.
    pub fn new(timeout: Duration) -> Self {
        Self {
            pool: Arc::new(DashMap::new()),
            pinned: Arc::new(HashSet::from([NameServer::SystemDefault])),
            timeout,
        }
    }

    /// Adds `servers` to the set whose resolvers are kept between queries.
    pub fn with_pinned<I>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = NameServer>,
    {
        let mut pinned: HashSet<NameServer> = self.pinned.iter().copied().collect();
        pinned.extend(servers);
        self.pinned = Arc::new(pinned);
        self
    }

    /// Number of nameservers a resolver is pooled for. Never exceeds the pinned set.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    pub fn is_pinned(&self, server: &NameServer) -> bool {
        self.pinned.contains(server)
    }

    fn resolver_for(&self, server: NameServer) -> TokioResolver {
        if !self.is_pinned(&server) {
            tracing::trace!(%server, "building short-lived resolver for unpinned nameserver");
            return self.build(server);
        }
        self.pool
            .entry(server)
            .or_insert_with(|| self.build(server))
            .clone()
    }

    fn build(&self, server: NameServer) -> TokioResolver {
        let mut builder = match server {
            NameServer::SystemDefault => match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("Using system DNS configuration");
                    builder
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to read system DNS config, using defaults"
                    );
                    TokioResolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            },
            NameServer::Ip(ip) => {
                tracing::debug!(server = %ip, "building resolver for explicit nameserver");
                let group = NameServerConfigGroup::from_ips_clear(&[ip], 53, true);
                TokioResolver::builder_with_config(
                    ResolverConfig::from_parts(None, vec![], group),
                    TokioConnectionProvider::default(),
                )
            }
        };

        let options = builder.options_mut();
        options.timeout = self.timeout;
        options.attempts = 1;

        builder.build()
    }
}

impl fmt::Debug for HickoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HickoryClient")
            .field("pooled", &self.pool.len())
            .field("pinned", &self.pinned.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DnsClient for HickoryClient {
    fn query(&self, name: Name, kind: RecordKind, server: NameServer) -> Querying {
        let resolver = self.resolver_for(server);
        Box::pin(async move {
            tracing::debug!(domain = %name, %kind, %server, "querying via hickory-dns");

            let lookup = resolver
                .lookup(name.as_str(), record_type(kind))
                .await
                .map_err(|e| classify(&name, kind, e))?;

            let answers: Answers = lookup.iter().filter_map(|rdata| convert(rdata, kind)).collect();

            if answers.is_empty() {
                return Err(QueryError::NoRecords { nx_domain: false });
            }

            tracing::debug!(domain = %name, %kind, count = answers.len(), "hickory-dns query complete");
            Ok(answers)
        })
    }
}

fn record_type(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::A => RecordType::A,
        RecordKind::Cname => RecordType::CNAME,
        RecordKind::Ptr => RecordType::PTR,
    }
}

/// Keeps only records of the requested kind; an A answer also carries the
/// CNAME chain that led to it.
fn convert(rdata: &RData, kind: RecordKind) -> Option<RecordData> {
    match (rdata, kind) {
        (RData::A(a), RecordKind::A) => Some(RecordData::A(a.0)),
        (RData::CNAME(cname), RecordKind::Cname) => Some(RecordData::Cname(cname.0.to_utf8())),
        (RData::PTR(ptr), RecordKind::Ptr) => Some(RecordData::Ptr(ptr.0.to_utf8())),
        _ => None,
    }
}

fn classify(name: &Name, kind: RecordKind, error: ResolveError) -> QueryError {
    if error.is_nx_domain() {
        return QueryError::NoRecords { nx_domain: true };
    }
    if error.is_no_records_found() {
        return QueryError::NoRecords { nx_domain: false };
    }
    if let ResolveErrorKind::Proto(proto) = error.kind() {
        if matches!(proto.kind(), ProtoErrorKind::Timeout) {
            return QueryError::Timeout;
        }
    }
    tracing::debug!(domain = %name, %kind, error = %error, "hickory-dns query failed");
    QueryError::Failed(error.to_string())
}
