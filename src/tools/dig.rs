//! Record queries via the system `dig` utility.

use super::process::run_command;
use crate::base::neterror::NetError;
use crate::dns::{is_valid_target, DnsServer, INVALID_INPUT};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

/// Record types `dig` may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DigType {
    #[default]
    A,
    Aaaa,
    Any,
    Caa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Srv,
    Txt,
}

impl DigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigType::A => "A",
            DigType::Aaaa => "AAAA",
            DigType::Any => "ANY",
            DigType::Caa => "CAA",
            DigType::Cname => "CNAME",
            DigType::Mx => "MX",
            DigType::Ns => "NS",
            DigType::Ptr => "PTR",
            DigType::Soa => "SOA",
            DigType::Srv => "SRV",
            DigType::Txt => "TXT",
        }
    }
}

impl FromStr for DigType {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(DigType::A),
            "AAAA" => Ok(DigType::Aaaa),
            "ANY" => Ok(DigType::Any),
            "CAA" => Ok(DigType::Caa),
            "CNAME" => Ok(DigType::Cname),
            "MX" => Ok(DigType::Mx),
            "NS" => Ok(DigType::Ns),
            "PTR" => Ok(DigType::Ptr),
            "SOA" => Ok(DigType::Soa),
            "SRV" => Ok(DigType::Srv),
            "TXT" => Ok(DigType::Txt),
            _ => Err(NetError::UnsupportedRecordType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for DigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `dig <target> <TYPE> [@server]`
pub fn dig_args(target: &str, record_type: DigType, server: &DnsServer) -> Vec<String> {
    let mut args = vec![target.to_string(), record_type.to_string()];
    if !server.is_system_default() {
        args.push(format!("@{server}"));
    }
    args
}

/// Runs `dig` for `target`; `record_type` is parsed case-insensitively.
pub async fn run_dig(target: &str, record_type: &str, server: &DnsServer, timeout: Duration) -> String {
    if !is_valid_target(target) {
        return INVALID_INPUT.to_string();
    }
    let record_type = match record_type.parse::<DigType>() {
        Ok(t) => t,
        Err(e) => return format!("Error: {e}."),
    };
    tracing::info!(host = %target, %record_type, dns_server = %server, "running dig");
    run_command("dig", &dig_args(target, record_type, server), timeout).await
}
