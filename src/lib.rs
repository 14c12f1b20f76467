// src/lib.rs
pub mod config;
pub mod enrich;
pub mod handlers;
pub mod models;
pub mod refresh;
pub mod state;
pub mod steam;
pub mod storage;
pub mod utils;

use actix_web::web;
use log::{info, warn};
use std::sync::Arc;
use crate::config::Config;
use crate::enrich::region::{RegionTable, RegionTableError, BUILTIN_TABLE_VERSION};
use crate::refresh::{RefreshSettings, ServerListService};
use crate::state::AppState;
use crate::steam::{ServerSource, SteamClient, UpstreamError};
use crate::storage::memory::ServerCache;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load region table: {0}")]
    Regions(#[from] RegionTableError),
    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] UpstreamError),
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(handlers::index::health))
        .route("/api/servers", web::get().to(handlers::servers::get_servers))
        .route("/api/debug/requests", web::get().to(handlers::debug::request_stats))
        .route("/api/debug/cache", web::get().to(handlers::debug::cache_status))
        .route("/api/debug/cache", web::delete().to(handlers::debug::clear_cache))
        .route("/api/join/{address}", web::get().to(handlers::join::get_join_url));
}

/// Built-in region table unless `REGION_RULES_PATH` points at a replacement.
pub fn load_region_table(config: &Config) -> Result<RegionTable, RegionTableError> {
    let table = match &config.region_rules_path {
        Some(path) => {
            info!("Loading region rules from {}", path);
            RegionTable::from_json_file(path)?
        }
        None => {
            info!("Using built-in region rules v{}", BUILTIN_TABLE_VERSION);
            RegionTable::try_builtin()?
        }
    };

    for rule in table.shadowed_rules() {
        warn!("Region rule {} -> {} can never match", rule.network, rule.label);
    }
    info!("Region table has {} rules", table.len());
    Ok(table)
}

pub fn build_state(config: &Config, source: Arc<dyn ServerSource>) -> Result<AppState, StartupError> {
    let regions = load_region_table(config)?;
    let servers = ServerListService::new(
        source,
        Arc::new(ServerCache::new()),
        Arc::new(regions),
        RefreshSettings::from_config(config),
    );
    Ok(AppState::new(servers, config.join_url_template.clone()))
}

pub fn build_default_state(config: &Config) -> Result<AppState, StartupError> {
    let source = Arc::new(SteamClient::from_config(config)?);
    build_state(config, source)
}
