//! Second-stage lookup used when the DNS library fails outright.

use super::target::DnsServer;
use crate::tools::process::run_command;
use std::{future::Future, pin::Pin, time::Duration};

/// Alias for the `Future` returned by a fallback lookup. Always yields text.
pub type FallbackRunning = Pin<Box<dyn Future<Output = String> + Send>>;

/// A lookup strategy that cannot fail: whatever happens is reported as text.
pub trait Fallback: Send + Sync {
    fn run(&self, target: &str, server: &DnsServer) -> FallbackRunning;
}

/// Shells out to a system lookup utility (`nslookup` by default) as
/// `<program> <target> [<server>]`.
#[derive(Debug, Clone)]
pub struct CommandFallback {
    program: String,
    timeout: Duration,
}

impl CommandFallback {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Argument list passed to the utility.
    pub fn args(target: &str, server: &DnsServer) -> Vec<String> {
        let mut args = vec![target.to_string()];
        if !server.is_system_default() {
            args.push(server.to_string());
        }
        args
    }
}

impl Fallback for CommandFallback {
    fn run(&self, target: &str, server: &DnsServer) -> FallbackRunning {
        let program = self.program.clone();
        let timeout = self.timeout;
        let args = Self::args(target, server);
        Box::pin(async move {
            tracing::info!(%program, ?args, "falling back to system lookup utility");
            run_command(&program, &args, timeout).await
        })
    }
}
