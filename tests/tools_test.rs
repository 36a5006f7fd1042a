//! Tool Tests
//!
//! Covers:
//! - `Pinger` resolution prefix and argument handling
//! - `BulkLookup` rows, ordering and CSV persistence
//! - `StatusMonitor` caching
//! - `run_dig` argument validation
//!
//! External utilities are replaced by `echo`, so these run on unix only.
#![cfg(unix)]

use netdiag::config::DiagConfig;
use netdiag::dns::{
    Addrs, DnsClient, DnsServer, Fallback, FallbackRunning, Name, NameServer, QueryError, Querying,
    RecordData, RecordKind, Resolve, Resolver, Resolving,
};
use netdiag::tools::bulk::{BulkLookup, BulkOptions, CSV_HEADER, NOT_AVAILABLE};
use netdiag::tools::dig::{dig_args, run_dig, DigType};
use netdiag::tools::{Pinger, StatusMonitor};

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct ZoneClient {
    records: HashMap<(String, RecordKind), Vec<RecordData>>,
}

impl ZoneClient {
    fn with(mut self, name: &str, kind: RecordKind, answer: Vec<RecordData>) -> Self {
        self.records.insert((name.to_string(), kind), answer);
        self
    }
}

impl DnsClient for ZoneClient {
    fn query(&self, name: Name, kind: RecordKind, _server: NameServer) -> Querying {
        let answer = self
            .records
            .get(&(name.as_str().to_string(), kind))
            .cloned()
            .ok_or(QueryError::NoRecords { nx_domain: true });
        Box::pin(async move { answer })
    }
}

struct NoHosts;

impl Resolve for NoHosts {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            Err::<Addrs, _>(netdiag::NetError::dns_failed(
                name.as_str(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no hosts"),
            ))
        })
    }
}

struct SilentFallback;

impl Fallback for SilentFallback {
    fn run(&self, target: &str, _server: &DnsServer) -> FallbackRunning {
        let text = format!("fallback for {target}");
        Box::pin(async move { text })
    }
}

fn resolver() -> Arc<Resolver> {
    let zone = ZoneClient::default()
        .with("example.com", RecordKind::A, vec![RecordData::A(Ipv4Addr::new(192, 0, 2, 1))])
        .with(
            "1.2.0.192.in-addr.arpa",
            RecordKind::Ptr,
            vec![RecordData::Ptr("host1.example.com.".into())],
        )
        .with(
            "8.8.8.8.in-addr.arpa",
            RecordKind::Ptr,
            vec![RecordData::Ptr("dns.google.".into())],
        );
    Arc::new(Resolver::with_parts(
        &DiagConfig::default(),
        Arc::new(zone),
        Arc::new(NoHosts),
        Arc::new(SilentFallback),
    ))
}

fn echo_pinger(resolver: Arc<Resolver>) -> Arc<Pinger> {
    Arc::new(
        Pinger::new(resolver, DnsServer::parse("8.8.8.8"), Duration::from_secs(5)).with_program("echo"),
    )
}

#[tokio::test]
async fn test_ping_ip_literal() {
    let pinger = echo_pinger(resolver());
    assert_eq!(pinger.ping("192.0.2.7", 2).await, "-c 2 192.0.2.7\n");
}

#[tokio::test]
async fn test_ping_resolves_hostname_first() {
    let pinger = echo_pinger(resolver());
    assert_eq!(
        pinger.ping("example.com", 4).await,
        "Pinging resolved IP: 192.0.2.1\n\n-c 4 192.0.2.1\n"
    );
}

#[tokio::test]
async fn test_ping_unresolvable_hostname() {
    let pinger = echo_pinger(resolver());
    let out = pinger.ping("missing.example.com", 4).await;
    assert!(out.ends_with("Could not resolve 'missing.example.com' to an IP address to ping."));
}

#[tokio::test]
async fn test_ping_rejects_invalid_target() {
    let pinger = echo_pinger(resolver());
    assert_eq!(pinger.ping("8.8.8.8; reboot", 4).await, "Invalid input.");
}

#[tokio::test]
async fn test_bulk_rows() {
    let resolver = resolver();
    let bulk = BulkLookup::new(resolver.clone(), echo_pinger(resolver), 4);
    let options = BulkOptions {
        dns_server: DnsServer::parse("8.8.8.8"),
        ping: true,
        reverse_lookup: true,
    };

    let report = bulk
        .run("example.com, missing.example.com\nbad;entry 8.8.8.8\n", &options)
        .await;

    let targets: Vec<_> = report.rows.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(targets, vec!["example.com", "missing.example.com", "8.8.8.8"]);

    let first = &report.rows[0];
    assert_eq!(first.resolved_name, "example.com");
    assert_eq!(first.addresses, vec!["192.0.2.1"]);
    assert_eq!(first.ping, "Failed");
    assert_eq!(first.ptr, "host1.example.com");

    let missing = &report.rows[1];
    assert_eq!(missing.resolved_name, "missing.example.com");
    assert!(missing.addresses.is_empty());
    assert_eq!(missing.ping, NOT_AVAILABLE);
    assert_eq!(missing.ptr, NOT_AVAILABLE);

    let literal = &report.rows[2];
    assert_eq!(literal.resolved_name, "dns.google");
    assert_eq!(literal.addresses, vec!["8.8.8.8"]);
    assert_eq!(literal.ptr, "dns.google");

    let csv = report.to_csv();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(
        lines[2],
        "\"missing.example.com\",\"missing.example.com\",\"N/A\",\"N/A\",\"N/A\""
    );
}

#[tokio::test]
async fn test_bulk_without_extras() {
    let resolver = resolver();
    let bulk = BulkLookup::new(resolver.clone(), echo_pinger(resolver), 1);

    let report = bulk.run("example.com", &BulkOptions::default()).await;
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].ping, NOT_AVAILABLE);
    assert_eq!(report.rows[0].ptr, NOT_AVAILABLE);
}

#[tokio::test]
async fn test_bulk_persist() {
    let resolver = resolver();
    let bulk = BulkLookup::new(resolver.clone(), echo_pinger(resolver), 2);
    let report = bulk.run("example.com", &BulkOptions::default()).await;

    let dir = tempfile::tempdir().unwrap();
    let path = report.persist(dir.path()).await.unwrap();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("bulk_nslookup_result_"));
    assert!(name.ends_with(".csv"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), report.to_csv());
}

#[tokio::test]
async fn test_status_monitor_caches() {
    let monitor = StatusMonitor::new("192.0.2.1", Duration::from_secs(300), echo_pinger(resolver()));

    let first = monitor.status().await;
    assert!(!first.online);
    assert_eq!(first.message, "❌ 192.0.2.1 is OFFLINE or unreachable");
    assert_eq!(monitor.cache().len(), 1);

    let second = monitor.status().await;
    assert_eq!(first, second);
    assert_eq!(monitor.cache().len(), 1);
}

#[tokio::test]
async fn test_status_cache_expires() {
    let monitor = StatusMonitor::new("192.0.2.1", Duration::from_millis(50), echo_pinger(resolver()));

    monitor.status().await;
    assert!(monitor.cache().get("192.0.2.1").is_some());

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(monitor.cache().get("192.0.2.1").is_none());

    monitor.status().await;
    assert!(monitor.cache().get("192.0.2.1").is_some());
}

#[test]
fn test_dig_args() {
    assert_eq!(
        dig_args("example.com", DigType::Mx, &DnsServer::parse("1.1.1.1")),
        vec!["example.com", "MX", "@1.1.1.1"]
    );
    assert_eq!(
        dig_args("example.com", DigType::A, &DnsServer::SystemDefault),
        vec!["example.com", "A"]
    );
}

#[tokio::test]
async fn test_dig_rejects_unknown_type() {
    let out = run_dig("example.com", "HINFO", &DnsServer::SystemDefault, Duration::from_secs(1)).await;
    assert_eq!(out, "Error: Unsupported record type 'HINFO'.");
}
