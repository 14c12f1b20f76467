// src/storage/memory.rs
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::models::server::ServerInfo;

/// The single cached server list. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub servers: Option<Arc<Vec<ServerInfo>>>,
    pub fetched_at: Option<Instant>,
    pub fetched_at_utc: Option<DateTime<Utc>>,
    /// Only meaningful while `servers` is present.
    pub is_synthetic: bool,
}

impl CacheSnapshot {
    pub fn exists(&self) -> bool {
        self.servers.is_some()
    }

    pub fn server_count(&self) -> usize {
        self.servers.as_ref().map(|s| s.len()).unwrap_or(0)
    }

    pub fn age(&self, now: Instant) -> Option<Duration> {
        match (&self.servers, self.fetched_at) {
            (Some(_), Some(at)) => Some(now.saturating_duration_since(at)),
            _ => None,
        }
    }

    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now).map(|age| age < ttl).unwrap_or(false)
    }
}

pub struct ServerCache {
    snapshot: RwLock<CacheSnapshot>,
}

impl ServerCache {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(CacheSnapshot::default()),
        }
    }

    /// True iff a snapshot exists and is younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.snapshot.read().is_fresh(now, ttl)
    }

    pub fn get(&self) -> CacheSnapshot {
        self.snapshot.read().clone()
    }

    /// Replace the snapshot. Returns the stored list so callers can serve it.
    pub fn put(&self, servers: Vec<ServerInfo>, is_synthetic: bool, now: Instant) -> Arc<Vec<ServerInfo>> {
        let servers = Arc::new(servers);
        let mut snapshot = self.snapshot.write();

        // fetched_at never goes backwards, even if a slower writer lands last
        let fetched_at = match snapshot.fetched_at {
            Some(prev) if prev > now => prev,
            _ => now,
        };

        *snapshot = CacheSnapshot {
            servers: Some(servers.clone()),
            fetched_at: Some(fetched_at),
            fetched_at_utc: Some(Utc::now()),
            is_synthetic,
        };
        servers
    }

    pub fn clear(&self) {
        *self.snapshot.write() = CacheSnapshot::default();
    }
}

impl Default for ServerCache {
    fn default() -> Self {
        Self::new()
    }
}
