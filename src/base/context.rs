//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add DNS resolution context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use netdiag::base::IoResultExt;
    ///
    /// let addrs = ("example.com", 0).to_socket_addrs().dns_context("example.com")?;
    /// // Error: "Name not resolved: example.com"
    /// ```
    fn dns_context(self, domain: &str) -> Result<T, NetError>;

    /// Mark an IO error as a failure to resolve the selected DNS server.
    fn server_context(self, server: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }

    fn server_context(self, server: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::server_unresolvable(server, e))
    }
}
