//! Diagnostic tools built on external utilities and raw sockets.
//!
//! Every tool validates its target before running anything and reports
//! failures as text rather than errors.

pub mod bulk;
pub mod dig;
pub mod netconn;
pub mod ping;
pub mod process;
pub mod status;
pub mod traceroute;

pub use bulk::{BulkLookup, BulkOptions, BulkReport, BulkRow};
pub use dig::{run_dig, DigType};
pub use netconn::{parse_port, run_test_netconnection};
pub use ping::{replied, Pinger};
pub use process::run_command;
pub use status::{StatusCache, StatusMonitor, StatusSnapshot};
pub use traceroute::run_traceroute;
