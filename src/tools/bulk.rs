//! CSV-driven batch lookups.
//!
//! Input is free-form: every line is split on commas and whitespace, and
//! tokens that are not valid targets are dropped. Each remaining target gets
//! one output row, in input order.

use super::ping::{replied, Pinger};
use crate::dns::{is_valid_target, report, DnsServer, Resolver};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::{
    io,
    net::IpAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use time::OffsetDateTime;

pub const CSV_HEADER: &str = "Target,Resolved_Name,Resolved_IP,Ping_Result,Reverse_Lookup_PTR";
pub const NOT_AVAILABLE: &str = "N/A";

/// Per-batch switches.
#[derive(Debug, Clone, Default)]
pub struct BulkOptions {
    pub dns_server: DnsServer,
    /// Ping the first resolved address once.
    pub ping: bool,
    /// PTR lookup on the first resolved address.
    pub reverse_lookup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkRow {
    pub target: String,
    pub resolved_name: String,
    pub addresses: Vec<String>,
    pub ping: String,
    pub ptr: String,
}

impl BulkRow {
    fn to_csv_line(&self) -> String {
        let ips = if self.addresses.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.addresses.join("; ")
        };
        [
            self.target.as_str(),
            self.resolved_name.as_str(),
            ips.as_str(),
            self.ping.as_str(),
            self.ptr.as_str(),
        ]
        .iter()
        .map(|field| quote(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    pub rows: Vec<BulkRow>,
    pub generated_at: OffsetDateTime,
}

impl BulkReport {
    /// Header plus one line per row, newline-separated.
    pub fn to_csv(&self) -> String {
        std::iter::once(CSV_HEADER.to_string())
            .chain(self.rows.iter().map(BulkRow::to_csv_line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `bulk_nslookup_result_YYYYmmdd_HHMMSS.csv` (UTC).
    pub fn file_name(&self) -> String {
        let t = self.generated_at;
        format!(
            "bulk_nslookup_result_{:04}{:02}{:02}_{:02}{:02}{:02}.csv",
            t.year(),
            u8::from(t.month()),
            t.day(),
            t.hour(),
            t.minute(),
            t.second()
        )
    }

    /// Writes the CSV into `dir`, creating it if needed.
    pub async fn persist(&self, dir: &Path) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.to_csv()).await?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "bulk report written");
        Ok(path)
    }
}

/// Splits uploaded content into valid targets.
pub fn parse_targets(content: &str) -> Vec<String> {
    content
        .lines()
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|token| is_valid_target(token))
        .map(String::from)
        .collect()
}

/// Runs nslookup (and optionally ping / PTR) for every target of a batch.
#[derive(Debug, Clone)]
pub struct BulkLookup {
    resolver: Arc<Resolver>,
    pinger: Arc<Pinger>,
    concurrency: usize,
}

impl BulkLookup {
    pub fn new(resolver: Arc<Resolver>, pinger: Arc<Pinger>, concurrency: usize) -> Self {
        Self {
            resolver,
            pinger,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self, content: &str, options: &BulkOptions) -> BulkReport {
        let targets = parse_targets(content);
        tracing::info!(
            targets = targets.len(),
            dns_server = %options.dns_server,
            ping = options.ping,
            reverse = options.reverse_lookup,
            "starting bulk lookup"
        );

        let rows = stream::iter(targets)
            .map(|target| self.row(target, options))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        BulkReport {
            rows,
            generated_at: OffsetDateTime::now_utc(),
        }
    }

    async fn row(&self, target: String, options: &BulkOptions) -> BulkRow {
        let text = self.resolver.nslookup(&target, &options.dns_server).await;
        let addresses = report::extract_addresses(&text);
        let resolved_name = report::extract_name(&text).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let first = addresses.first().cloned();

        let ping = match (&first, options.ping) {
            (Some(ip), true) => {
                let output = self.pinger.ping(ip, 1).await;
                let verdict = if replied(&output) { "Success" } else { "Failed" };
                verdict.to_string()
            }
            _ => NOT_AVAILABLE.to_string(),
        };

        let ptr = match (first.as_deref().map(str::parse::<IpAddr>), options.reverse_lookup) {
            (Some(Ok(ip)), true) => self.resolver.resolve_ptr(ip, &options.dns_server).await,
            _ => NOT_AVAILABLE.to_string(),
        };

        BulkRow {
            target,
            resolved_name,
            addresses,
            ping,
            ptr,
        }
    }
}
