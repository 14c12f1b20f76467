// src/enrich/mod.rs
pub mod gamemode;
pub mod region;

use log::warn;
use thiserror::Error;
use crate::models::server::{RawServer, ServerInfo};
use self::gamemode::classify_gamemode;
use self::region::RegionTable;

pub const UNKNOWN_SERVER_NAME: &str = "Unknown Server";
pub const UNKNOWN_MAP_NAME: &str = "Unknown Map";

/// Why a raw record was dropped instead of enriched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("server address is missing")]
    MissingAddress,
    #[error("invalid server address: {0}")]
    InvalidAddress(String),
}

/// Turn one upstream record into a client-facing record.
pub fn enrich(raw: &RawServer, regions: &RegionTable) -> Result<ServerInfo, MalformedRecord> {
    let addr = match raw.addr() {
        Some(Ok(a)) if !a.is_empty() => a,
        Some(Err(sent)) => return Err(MalformedRecord::InvalidAddress(sent)),
        _ => return Err(MalformedRecord::MissingAddress),
    };

    let host = match addr.split_once(':') {
        Some((host, _port)) => host.trim(),
        None => return Err(MalformedRecord::InvalidAddress(addr.to_string())),
    };

    let map = raw.map().filter(|m| !m.is_empty());

    Ok(ServerInfo {
        id: addr.to_string(),
        name: raw
            .name()
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_SERVER_NAME)
            .to_string(),
        map: map.unwrap_or(UNKNOWN_MAP_NAME).to_string(),
        gamemode: classify_gamemode(map).to_string(),
        players: format!(
            "{}/{}",
            raw.players().unwrap_or_else(|| "0".to_string()),
            raw.max_players().unwrap_or_else(|| "0".to_string())
        ),
        region: regions.classify(host).to_string(),
        address: addr.to_string(),
    })
}

/// Enrich a batch, dropping malformed records and keeping upstream order.
pub fn enrich_all(raw: &[RawServer], regions: &RegionTable) -> Vec<ServerInfo> {
    raw.iter()
        .filter_map(|server| match enrich(server, regions) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Dropping server record: {}", e);
                None
            }
        })
        .collect()
}
