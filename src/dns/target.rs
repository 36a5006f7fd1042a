//! Target grammar: what a user may type into the target and DNS server fields.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

/// Label shown for "use the host's resolver configuration".
pub const SYSTEM_DEFAULT: &str = "System Default";

/// Returns `true` if `target` is non-empty and only contains alphanumerics
/// (Unicode letters and digits included, so IDN labels pass), `.`, `-` or `_`.
///
/// Everything accepted here is later passed as a single argument to external
/// commands, so shell metacharacters and whitespace must never get through.
pub fn is_valid_target(target: &str) -> bool {
    !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Returns `true` if `target` is an IPv4 or IPv6 address literal.
pub fn is_ip_address(target: &str) -> bool {
    target.parse::<IpAddr>().is_ok()
}

/// A hostname without any dot that is not an address literal.
pub fn is_single_label(target: &str) -> bool {
    !target.contains('.') && !is_ip_address(target)
}

/// Strips the trailing root dot from a fully-qualified name.
pub fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Builds the reverse-pointer name used for PTR queries.
///
/// `8.8.4.4` becomes `4.4.8.8.in-addr.arpa`; IPv6 addresses are expanded to
/// 32 nibbles under `ip6.arpa`.
pub fn reverse_pointer(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => reverse_v4(v4),
        IpAddr::V6(v6) => reverse_v6(v6),
    }
}

fn reverse_v4(ip: Ipv4Addr) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{d}.{c}.{b}.{a}.in-addr.arpa")
}

fn reverse_v6(ip: Ipv6Addr) -> String {
    let mut name = String::with_capacity(72);
    for byte in ip.octets().iter().rev() {
        name.push_str(&format!("{:x}.{:x}.", byte & 0x0f, byte >> 4));
    }
    name.push_str("ip6.arpa");
    name
}

/// DNS server selected by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DnsServer {
    /// Use the host's resolver configuration.
    #[default]
    SystemDefault,
    /// Query this address directly.
    Ip(IpAddr),
    /// Resolve this hostname through the OS first, then query it.
    Hostname(String),
}

impl DnsServer {
    /// Parses the user-facing server string.
    ///
    /// Blank input and [`SYSTEM_DEFAULT`] both select the system resolver.
    pub fn parse(server: &str) -> Self {
        let server = server.trim();
        if server.is_empty() || server == SYSTEM_DEFAULT {
            return DnsServer::SystemDefault;
        }
        match server.parse::<IpAddr>() {
            Ok(ip) => DnsServer::Ip(ip),
            Err(_) => DnsServer::Hostname(server.to_string()),
        }
    }

    pub fn is_system_default(&self) -> bool {
        matches!(self, DnsServer::SystemDefault)
    }
}

impl From<&str> for DnsServer {
    fn from(value: &str) -> Self {
        DnsServer::parse(value)
    }
}

impl From<Option<&str>> for DnsServer {
    fn from(value: Option<&str>) -> Self {
        value.map(DnsServer::parse).unwrap_or_default()
    }
}

impl fmt::Display for DnsServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsServer::SystemDefault => f.write_str(SYSTEM_DEFAULT),
            DnsServer::Ip(ip) => fmt::Display::fmt(ip, f),
            DnsServer::Hostname(host) => f.write_str(host),
        }
    }
}
