use crate::dns::RecordKind;
use std::{io, sync::Arc};
use thiserror::Error;

/// Errors produced by the resolver and the diagnostic tools.
///
/// Absence of DNS records is not represented here: NXDOMAIN and
/// empty answers are normal results, see [`crate::dns::QueryError`].
#[derive(Debug, Error, Clone)]
pub enum NetError {
    /// Target contains characters outside `[A-Za-z0-9._-]` or is empty.
    #[error("Invalid target '{target}'")]
    InvalidInput { target: String },

    /// The configured DNS server is a hostname the OS could not resolve.
    #[error("Could not resolve DNS server hostname '{server}'")]
    DnsServerUnresolvable {
        server: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// A single DNS query exceeded its deadline.
    #[error("{kind} query for {name} timed out")]
    QueryTimeout { name: String, kind: RecordKind },

    /// The DNS library failed for a reason other than missing records.
    #[error("{kind} query for {name} failed: {message}")]
    QueryFailed {
        name: String,
        kind: RecordKind,
        message: String,
    },

    /// OS address resolution failed for a host.
    #[error("Name not resolved: {domain}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// A blocking resolution task panicked or was cancelled.
    #[error("Resolver task failed")]
    ResolverTaskFailed,

    #[error("Port number must be between 1 and 65535 (got '{0}')")]
    InvalidPort(String),

    #[error("Unsupported record type '{0}'")]
    UnsupportedRecordType(String),
}

impl NetError {
    /// OS lookup failure for `domain`.
    pub fn dns_failed(domain: &str, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.to_string(),
            source: Arc::new(source),
        }
    }

    /// DNS server hostname could not be turned into an address.
    pub fn server_unresolvable(server: &str, source: io::Error) -> Self {
        NetError::DnsServerUnresolvable {
            server: server.to_string(),
            source: Arc::new(source),
        }
    }

    /// Whether a failure of the primary resolution path hands over to the
    /// external lookup utility.
    ///
    /// Input and server-selection errors are reported to the caller as-is;
    /// only infrastructure failures inside the query path fall back.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            NetError::QueryTimeout { .. }
                | NetError::QueryFailed { .. }
                | NetError::ResolverTaskFailed
        )
    }
}
