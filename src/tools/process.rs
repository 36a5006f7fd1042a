//! Bounded-time execution of external command-line utilities.
//!
//! Every outcome, including failure to start, is rendered as text: callers
//! show the result to a user and never branch on it.

use std::{process::Stdio, time::Duration};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split};
use tokio::process::{ChildStderr, ChildStdout, Command};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs `program` with `args` and returns stdout and stderr merged line by line.
///
/// The child is killed if it outlives `timeout`.
pub async fn run_command(program: &str, args: &[String], timeout: Duration) -> String {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    tracing::debug!(program, ?args, "spawning command");

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(program, "command not found");
            return format!("Error: Command '{program}' not found on the system.");
        }
        Err(e) => {
            tracing::error!(program, error = %e, "failed to spawn command");
            return format!("An unexpected error occurred: {e}");
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    // Dropping `child` on timeout kills it.
    let finished = async move {
        let text = interleave(stdout, stderr).await;
        child.wait().await.map(|status| (status, text))
    };

    let (status, text) = match tokio::time::timeout(timeout, finished).await {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => {
            tracing::error!(program, error = %e, "failed to collect command output");
            return format!("An unexpected error occurred: {e}");
        }
        Err(_) => {
            tracing::warn!(program, timeout = ?timeout, "command timed out");
            return format!("Command timed out after {} seconds.", format_secs(timeout));
        }
    };

    if status.success() {
        text
    } else {
        tracing::warn!(program, status = %status, output = %text.trim(), "command failed");
        format!("Command failed:\n{}", text.trim())
    }
}

/// Merges stdout and stderr line by line in arrival order.
async fn interleave(stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) -> String {
    let mut out = stdout.map(|s| BufReader::new(s).split(b'\n'));
    let mut err = stderr.map(|s| BufReader::new(s).split(b'\n'));
    let mut text = String::new();

    loop {
        let line = tokio::select! {
            Some(line) = next_line(&mut out) => line,
            Some(line) = next_line(&mut err) => line,
            else => break,
        };
        text.push_str(&String::from_utf8_lossy(&line));
        text.push('\n');
    }
    text
}

/// Next line of a stream; a closed or failed stream is dropped.
async fn next_line<R>(lines: &mut Option<Split<R>>) -> Option<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let reader = lines.as_mut()?;
    match reader.next_segment().await {
        Ok(Some(line)) => Some(line),
        _ => {
            *lines = None;
            None
        }
    }
}

fn format_secs(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.1}", duration.as_secs_f64())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = run_command("echo", &args(&["hello", "world"]), Duration::from_secs(5)).await;
        assert_eq!(out, "hello world\n");
    }

    #[tokio::test]
    async fn test_captures_stderr() {
        let out = run_command("sh", &args(&["-c", "echo out; echo err >&2"]), Duration::from_secs(5)).await;
        assert!(out.contains("out"));
        assert!(out.contains("err"));
    }

    #[tokio::test]
    async fn test_streams_merge_in_arrival_order() {
        let script = "echo one; sleep 0.2; echo two >&2; sleep 0.2; echo three";
        let out = run_command("sh", &args(&["-c", script]), Duration::from_secs(5)).await;
        assert_eq!(out, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let out = run_command("definitely-not-a-real-binary-xyz", &[], Duration::from_secs(5)).await;
        assert_eq!(
            out,
            "Error: Command 'definitely-not-a-real-binary-xyz' not found on the system."
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let out = run_command("sh", &args(&["-c", "echo boom; exit 3"]), Duration::from_secs(5)).await;
        assert_eq!(out, "Command failed:\nboom");
    }

    #[tokio::test]
    async fn test_timeout() {
        let out = run_command("sleep", &args(&["5"]), Duration::from_millis(200)).await;
        assert_eq!(out, "Command timed out after 0.2 seconds.");
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(Duration::from_secs(10)), "10");
        assert_eq!(format_secs(Duration::from_millis(1500)), "1.5");
    }
}
