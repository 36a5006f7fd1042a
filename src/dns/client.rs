//! Record-level DNS query abstraction.
//!
//! [`DnsClient`] is the seam between the resolver logic and the DNS library.
//! The production implementation is [`super::HickoryClient`]; tests plug in
//! in-memory zones.

use super::resolve::Name;
use std::{
    fmt,
    future::Future,
    net::{IpAddr, Ipv4Addr},
    pin::Pin,
    sync::Arc,
};
use thiserror::Error;

/// Record types the resolver asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    Cname,
    Ptr,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::A => "A",
            RecordKind::Cname => "CNAME",
            RecordKind::Ptr => "PTR",
        })
    }
}

/// One record from an answer section.
///
/// Names keep whatever trailing root dot the server returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Cname(String),
    Ptr(String),
}

/// Why a query produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// NXDOMAIN or NOERROR with an empty answer. Not a failure.
    #[error("no records found")]
    NoRecords { nx_domain: bool },

    #[error("query timed out")]
    Timeout,

    #[error("{0}")]
    Failed(String),
}

/// Nameserver a query is sent to, after any hostname has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameServer {
    SystemDefault,
    Ip(IpAddr),
}

impl fmt::Display for NameServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameServer::SystemDefault => f.write_str(super::target::SYSTEM_DEFAULT),
            NameServer::Ip(ip) => fmt::Display::fmt(ip, f),
        }
    }
}

/// Records returned for a single query.
pub type Answers = Vec<RecordData>;

/// Alias for the `Future` type returned by a DNS client.
pub type Querying = Pin<Box<dyn Future<Output = Result<Answers, QueryError>> + Send>>;

/// Issues single record queries.
///
/// Implementations do not retry. The caller enforces the per-query deadline,
/// but implementations should also stop on their own at roughly the same time.
pub trait DnsClient: Send + Sync {
    fn query(&self, name: Name, kind: RecordKind, server: NameServer) -> Querying;
}

impl<C: DnsClient + ?Sized> DnsClient for Arc<C> {
    fn query(&self, name: Name, kind: RecordKind, server: NameServer) -> Querying {
        (**self).query(name, kind, server)
    }
}
