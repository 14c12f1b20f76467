// src/refresh.rs
//! Read-through server list: serve from cache while fresh, otherwise ask
//! upstream, and fall back to the last snapshot when upstream is down.

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use crate::config::Config;
use crate::enrich::enrich_all;
use crate::enrich::region::RegionTable;
use crate::models::server::{synthetic_servers, ServerInfo};
use crate::steam::{ServerSource, UpstreamError};
use crate::storage::memory::{CacheSnapshot, ServerCache};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("upstream unavailable and nothing cached: {0}")]
    NoFallbackAvailable(#[source] UpstreamError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Fresh snapshot served without touching upstream.
    CacheHit { age: Duration },
    /// Upstream answered and the cache was overwritten.
    Refreshed,
    /// Upstream failed; a stale snapshot was served instead.
    ErrorFallback { age: Option<Duration> },
}

#[derive(Debug, Clone)]
pub struct ServerListing {
    pub servers: Arc<Vec<ServerInfo>>,
    pub is_synthetic: bool,
    pub outcome: ServeOutcome,
}

impl ServerListing {
    pub fn from_cache(&self) -> bool {
        !matches!(self.outcome, ServeOutcome::Refreshed)
    }

    pub fn is_error_fallback(&self) -> bool {
        matches!(self.outcome, ServeOutcome::ErrorFallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub tag: String,
    pub limit: u32,
    pub ttl: Duration,
}

impl RefreshSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tag: config.upstream_tag.clone(),
            limit: config.upstream_limit,
            ttl: config.cache_ttl(),
        }
    }
}

pub struct ServerListService {
    source: Arc<dyn ServerSource>,
    cache: Arc<ServerCache>,
    regions: Arc<RegionTable>,
    settings: RefreshSettings,
    // Held for the whole upstream round trip so stale readers queue behind
    // a single refresh instead of each calling upstream.
    refresh_guard: Mutex<()>,
}

impl ServerListService {
    pub fn new(
        source: Arc<dyn ServerSource>,
        cache: Arc<ServerCache>,
        regions: Arc<RegionTable>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            source,
            cache,
            regions,
            settings,
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &ServerCache {
        &self.cache
    }

    pub async fn serve(&self, force_refresh: bool) -> Result<ServerListing, RefreshError> {
        self.serve_at(force_refresh, Instant::now()).await
    }

    pub async fn serve_at(&self, force_refresh: bool, now: Instant) -> Result<ServerListing, RefreshError> {
        if !force_refresh {
            if let Some(hit) = self.cache_hit(now) {
                return Ok(hit);
            }
        }

        let _guard = self.refresh_guard.lock().await;

        // Someone else may have refreshed while we waited
        if !force_refresh {
            if let Some(hit) = self.cache_hit(now) {
                debug!("Cache refreshed by a concurrent request, skipping upstream call");
                return Ok(hit);
            }
        }

        self.refresh(now).await
    }

    fn cache_hit(&self, now: Instant) -> Option<ServerListing> {
        let snapshot = self.cache.get();
        if !snapshot.is_fresh(now, self.settings.ttl) {
            return None;
        }

        let age = snapshot.age(now)?;
        let servers = snapshot.servers?;
        Some(ServerListing {
            servers,
            is_synthetic: snapshot.is_synthetic,
            outcome: ServeOutcome::CacheHit { age },
        })
    }

    async fn refresh(&self, now: Instant) -> Result<ServerListing, RefreshError> {
        let raw = match self.source.fetch_tagged(&self.settings.tag, self.settings.limit).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Error fetching servers: {}", e);
                return self.fall_back(self.cache.get(), now, e);
            }
        };

        if raw.is_empty() {
            info!("No servers found with the {} tag, serving placeholder data", self.settings.tag);
            let servers = self.cache.put(synthetic_servers(), true, now);
            return Ok(ServerListing {
                servers,
                is_synthetic: true,
                outcome: ServeOutcome::Refreshed,
            });
        }

        let enriched = enrich_all(&raw, &self.regions);
        info!("Refreshed server list: {} listed, {} kept", raw.len(), enriched.len());
        let servers = self.cache.put(enriched, false, now);
        Ok(ServerListing {
            servers,
            is_synthetic: false,
            outcome: ServeOutcome::Refreshed,
        })
    }

    fn fall_back(&self, snapshot: CacheSnapshot, now: Instant, cause: UpstreamError) -> Result<ServerListing, RefreshError> {
        let age = snapshot.age(now);
        match snapshot.servers {
            Some(servers) => {
                warn!("Returning cached data as fallback after error");
                Ok(ServerListing {
                    servers,
                    is_synthetic: snapshot.is_synthetic,
                    outcome: ServeOutcome::ErrorFallback { age },
                })
            }
            None => Err(RefreshError::NoFallbackAvailable(cause)),
        }
    }
}
