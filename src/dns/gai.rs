//! System host resolver using getaddrinfo.
//!
//! This resolver uses the operating system's native resolution via
//! `getaddrinfo`, executed on the blocking thread pool so the async runtime
//! is never stalled. It is how a DNS server given by hostname (for example
//! `dns.google`) is turned into an address before any query is sent to it.

use super::{Addrs, Name, Resolve, Resolving};
use crate::base::{context::IoResultExt, neterror::NetError};
use std::{io, net::ToSocketAddrs};

/// System resolver using `getaddrinfo` in a thread pool.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    /// Creates a new `GaiResolver`.
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.as_str().to_string();
            let domain = host.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %host, "resolving via getaddrinfo");
                (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|iter| iter.collect::<Vec<_>>())
            })
            .await;

            // Handle task join error (cancellation, panic)
            let addrs = result
                .map_err(|e| {
                    tracing::error!(error = %e, "host resolution task failed");
                    NetError::ResolverTaskFailed
                })?
                .dns_context(&domain)?;

            if addrs.is_empty() {
                return Err(NetError::dns_failed(
                    &domain,
                    io::Error::new(io::ErrorKind::NotFound, "No addresses returned by getaddrinfo"),
                ));
            }

            tracing::debug!(domain = %domain, count = addrs.len(), "host resolution complete");
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}
