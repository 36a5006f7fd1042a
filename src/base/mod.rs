//! Base types and error handling.
//!
//! - [`NetError`]: failures surfaced by resolution and the diagnostic tools
//! - [`IoResultExt`]: context helpers turning `io::Error` into `NetError`

pub mod context;
pub mod neterror;

pub use context::IoResultExt;
pub use neterror::NetError;

#[cfg(test)]
mod tests;
