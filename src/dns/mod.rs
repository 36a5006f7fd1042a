//! DNS resolution module.
//!
//! Provides:
//! - [`Resolver`]: CNAME-then-A forward resolution with a default-domain
//!   suffix for single-label names, PTR lookups, and a fallback to an external
//!   lookup utility when the DNS library fails
//! - [`DnsClient`]: pluggable record-level queries, backed by hickory-dns
//! - [`Resolve`]: OS address resolution (getaddrinfo) for DNS server hostnames
//!
//! # Example
//!
//! ```rust,ignore
//! use netdiag::config::DiagConfig;
//! use netdiag::dns::{DnsServer, Resolver};
//!
//! let resolver = Resolver::new(&DiagConfig::default());
//! let result = resolver.resolve("example.com", &DnsServer::parse("8.8.8.8")).await?;
//! for addr in &result.addresses {
//!     println!("Resolved: {}", addr);
//! }
//! ```

mod client;
mod fallback;
mod gai;
mod hickory;
pub mod report;
mod resolve;
mod resolver;
pub mod target;

pub use client::{Answers, DnsClient, NameServer, QueryError, Querying, RecordData, RecordKind};
pub use fallback::{CommandFallback, Fallback, FallbackRunning};
pub use gai::GaiResolver;
pub use hickory::HickoryClient;
pub use resolve::{Addrs, Name, Resolve, Resolving};
pub use resolver::{
    LookupOutcome, ResolutionResult, Resolver, INVALID_INPUT, NO_PTR_RECORD, PTR_ERROR,
};
pub use target::{is_ip_address, is_valid_target, DnsServer, SYSTEM_DEFAULT};
