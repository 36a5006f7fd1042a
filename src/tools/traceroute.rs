//! Path tracing via `traceroute` (or `tracert` on Windows).

use super::process::run_command;
use crate::dns::{is_valid_target, INVALID_INPUT};
use std::time::Duration;

pub const ORIGIN_NOTE: &str = "Note: This traceroute originates from the application server.\n\
The network path shown may differ from the path taken from your local machine or other locations.\n\n";

pub fn traceroute_program() -> &'static str {
    if cfg!(windows) {
        "tracert"
    } else {
        "traceroute"
    }
}

pub async fn run_traceroute(target: &str, timeout: Duration) -> String {
    trace_with(traceroute_program(), target, timeout).await
}

async fn trace_with(program: &str, target: &str, timeout: Duration) -> String {
    if !is_valid_target(target) {
        return INVALID_INPUT.to_string();
    }
    tracing::info!(host = %target, program, "running traceroute");
    let output = run_command(program, &[target.to_string()], timeout).await;
    format!("{ORIGIN_NOTE}{output}")
}
