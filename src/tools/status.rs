//! Reachability status of a check host, cached per host.

use super::ping::Pinger;
use dashmap::DashMap;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::time::Instant;

/// Result of one reachability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub online: bool,
    pub message: String,
    /// Unix timestamp (seconds) of the check.
    pub last_checked: i64,
}

impl StatusSnapshot {
    pub fn from_ping_output(host: &str, output: &str, checked_at: i64) -> Self {
        let lowered = output.to_ascii_lowercase();
        let online = ["time=", "ttl=", "bytes="]
            .iter()
            .any(|marker| lowered.contains(marker));
        let message = if online {
            format!("✅ {host} is ONLINE")
        } else {
            format!("❌ {host} is OFFLINE or unreachable")
        };
        Self {
            online,
            message,
            last_checked: checked_at,
        }
    }
}

/// Snapshots keyed by host, each valid for `ttl`.
#[derive(Debug)]
pub struct StatusCache {
    entries: DashMap<String, (Instant, StatusSnapshot)>,
    ttl: Duration,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh snapshot for `host`, if any.
    pub fn get(&self, host: &str) -> Option<StatusSnapshot> {
        let entry = self.entries.get(host)?;
        let (stored_at, snapshot) = entry.value();
        (stored_at.elapsed() < self.ttl).then(|| snapshot.clone())
    }

    pub fn insert(&self, host: impl Into<String>, snapshot: StatusSnapshot) {
        self.entries.insert(host.into(), (Instant::now(), snapshot));
    }

    /// Drops expired entries.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pings the configured check host at most once per cache interval.
#[derive(Debug, Clone)]
pub struct StatusMonitor {
    host: String,
    cache: Arc<StatusCache>,
    pinger: Arc<Pinger>,
}

impl StatusMonitor {
    pub fn new(host: impl Into<String>, interval: Duration, pinger: Arc<Pinger>) -> Self {
        Self {
            host: host.into(),
            cache: Arc::new(StatusCache::new(interval)),
            pinger,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    /// Status of the configured check host.
    pub async fn status(&self) -> StatusSnapshot {
        self.status_of(&self.host).await
    }

    /// Status of an arbitrary host, served from the cache when fresh.
    pub async fn status_of(&self, host: &str) -> StatusSnapshot {
        if let Some(snapshot) = self.cache.get(host) {
            tracing::trace!(host, "status cache hit");
            return snapshot;
        }

        let output = self.pinger.ping(host, 1).await;
        let snapshot =
            StatusSnapshot::from_ping_output(host, &output, OffsetDateTime::now_utc().unix_timestamp());
        tracing::info!(host, online = snapshot.online, "status check complete");

        self.cache.purge_expired();
        self.cache.insert(host, snapshot.clone());
        snapshot
    }
}
