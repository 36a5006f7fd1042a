//! ICMP echo via the system `ping` utility.

use super::process::run_command;
use crate::dns::{is_ip_address, is_valid_target, report, DnsServer, Resolver, INVALID_INPUT};
use std::{sync::Arc, time::Duration};

/// Runs `ping`, resolving hostnames through [`Resolver`] first so the
/// address pinged is the one the selected DNS server returns.
#[derive(Debug, Clone)]
pub struct Pinger {
    resolver: Arc<Resolver>,
    server: DnsServer,
    timeout: Duration,
    program: String,
}

impl Pinger {
    pub fn new(resolver: Arc<Resolver>, server: DnsServer, timeout: Duration) -> Self {
        Self {
            resolver,
            server,
            timeout,
            program: "ping".to_string(),
        }
    }

    /// Replaces the `ping` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Platform-specific arguments for `count` echo requests.
    pub fn command_args(target: &str, count: u32) -> Vec<String> {
        let count_flag = if cfg!(windows) { "-n" } else { "-c" };
        vec![count_flag.to_string(), count.to_string(), target.to_string()]
    }

    /// Pings `target` `count` times and returns the utility's output.
    ///
    /// Hostnames are resolved first; the output is then prefixed with any
    /// resolution notes and the address actually pinged.
    pub async fn ping(&self, target: &str, count: u32) -> String {
        if !is_valid_target(target) {
            return INVALID_INPUT.to_string();
        }
        tracing::info!(host = %target, count, "running ping");

        let mut prefix = String::new();
        let mut ping_target = target.to_string();

        if !is_ip_address(target) {
            let (addresses, notes) = match self.resolver.resolve(target, &self.server).await {
                Ok(result) => (result.addresses, result.notes),
                Err(e) => (Vec::new(), Some(report::error_note(&e))),
            };
            let Some(first) = addresses.into_iter().next() else {
                return format!(
                    "{}\nCould not resolve '{target}' to an IP address to ping.",
                    notes.unwrap_or_default()
                );
            };
            if let Some(notes) = notes {
                prefix.push_str(&notes);
                prefix.push('\n');
            }
            prefix.push_str(&format!("Pinging resolved IP: {first}\n\n"));
            ping_target = first;
        }

        let output = run_command(&self.program, &Self::command_args(&ping_target, count), self.timeout).await;
        prefix + &output
    }
}

/// Whether ping output shows at least one reply.
pub fn replied(output: &str) -> bool {
    output.to_ascii_lowercase().contains("ttl=")
}
