//! # netdiag
//!
//! Network diagnostics for a web-facing troubleshooting tool.
//!
//! The core is a DNS resolution helper that follows CNAME records before
//! querying A records against a caller-selected server, appends a default
//! domain to single-label names, and falls back to the system `nslookup`
//! when the DNS library fails. Around it sit the usual diagnostic tools.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netdiag::{DiagConfig, Diagnostics};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DiagConfig::from_env().expect("valid configuration");
//!     let diag = Diagnostics::new(config);
//!     println!("{}", diag.nslookup("example.com", Some("8.8.8.8")).await);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions and context helpers
//! - [`config`] - Immutable configuration, optionally read from the environment
//! - [`dns`] - Forward/reverse resolution with fallback, and report formatting
//! - [`tools`] - Ping, dig, traceroute, port checks, bulk lookups, status monitor
//! - [`diagnostics`] - Shared context and JSON request/response payloads

pub mod base;
pub mod config;
pub mod diagnostics;
pub mod dns;
pub mod tools;

pub use base::neterror::NetError;
pub use config::{ConfigError, DiagConfig, Timeouts};
pub use diagnostics::{Diagnostics, ToolRequest, ToolResponse};
pub use dns::{DnsServer, LookupOutcome, ResolutionResult, Resolver};
