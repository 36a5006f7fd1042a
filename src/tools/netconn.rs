//! Port reachability checks in the spirit of `Test-NetConnection`.

use crate::base::neterror::NetError;
use crate::dns::{is_valid_target, INVALID_INPUT};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpStream;

pub const FALSE_NEGATIVE_NOTE: &str = "\n\nNote: Network segmentation or firewalls may cause a port \
to appear closed (a \"false negative\") even if the service is running.";

pub const UDP_UNSUPPORTED: &str = "UDP connection test is not easily implemented with standard \
utilities in a non-interactive way.";

pub const UNSUPPORTED_PROTOCOL: &str = "Unsupported protocol.";

pub const INVALID_PORT: &str = "Error: Port number must be between 1 and 65535.";

/// Parses a user-supplied port in `1..=65535`.
pub fn parse_port(raw: &str) -> Result<u16, NetError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(NetError::InvalidPort(raw.to_string())),
    }
}

/// Checks `target:port` over `protocol` (`tcp` or `udp`, case-insensitive).
pub async fn run_test_netconnection(target: &str, port: u16, protocol: &str, timeout: Duration) -> String {
    if !is_valid_target(target) {
        return INVALID_INPUT.to_string();
    }
    match protocol.to_ascii_lowercase().as_str() {
        "tcp" => tcp_connect_test(target, port, timeout).await + FALSE_NEGATIVE_NOTE,
        "udp" => UDP_UNSUPPORTED.to_string(),
        _ => UNSUPPORTED_PROTOCOL.to_string(),
    }
}

/// Attempts a TCP connection and reports OPEN, CLOSED or unresolvable.
pub async fn tcp_connect_test(target: &str, port: u16, timeout: Duration) -> String {
    tracing::info!(host = %target, port, "testing TCP connection");

    let addrs: Vec<SocketAddr> = match tokio::net::lookup_host((target, port)).await {
        Ok(addrs) => addrs.collect(),
        Err(e) => {
            tracing::debug!(host = %target, error = %e, "port check target did not resolve");
            return format!("Hostname {target} could not be resolved.");
        }
    };
    let Some(addr) = addrs.iter().find(|a| a.is_ipv4()).or_else(|| addrs.first()).copied() else {
        return format!("Hostname {target} could not be resolved.");
    };

    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => format!("TCP Connection to {target}:{port} is OPEN."),
        Ok(Err(e)) => {
            let code = e
                .raw_os_error()
                .map(|c| c.to_string())
                .unwrap_or_else(|| e.kind().to_string());
            format!("TCP Connection to {target}:{port} is CLOSED or filtered. Error code: {code}")
        }
        Err(_) => format!("TCP Connection to {target}:{port} is CLOSED or filtered. Error code: timed out"),
    }
}
