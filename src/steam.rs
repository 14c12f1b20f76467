// src/steam.rs
use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use crate::config::Config;
use crate::models::server::RawServer;

/// Every variant means the upstream list is unavailable for this attempt.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream returned status {0}")]
    Status(StatusCode),
    #[error("upstream response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can list game servers carrying a tag.
///
/// An empty `Ok` is a valid answer meaning nobody advertised the tag.
#[async_trait]
pub trait ServerSource: Send + Sync {
    async fn fetch_tagged(&self, tag: &str, limit: u32) -> Result<Vec<RawServer>, UpstreamError>;
}

#[derive(Debug, Default, Deserialize)]
struct ServerListEnvelope {
    #[serde(default)]
    response: Option<ServerListResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerListResponse {
    #[serde(default)]
    servers: Option<Vec<RawServer>>,
}

/// Client for the master server list Web API.
pub struct SteamClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    app_id: u32,
    timeout: Duration,
}

impl SteamClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, app_id: u32, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UpstreamError::Transport)?;

        Ok(Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
            app_id,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        Self::new(
            config.upstream_url.clone(),
            config.steam_api_key.clone(),
            config.upstream_app_id,
            config.upstream_timeout(),
        )
    }

    pub fn filter_for(&self, tag: &str) -> String {
        format!("\\appid\\{}\\gametagsand\\{}", self.app_id, tag)
    }

    fn map_transport(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(e)
        }
    }
}

pub fn decode_server_list(body: &[u8]) -> Result<Vec<RawServer>, UpstreamError> {
    let envelope: ServerListEnvelope = serde_json::from_slice(body)?;
    Ok(envelope
        .response
        .and_then(|r| r.servers)
        .unwrap_or_default())
}

#[async_trait]
impl ServerSource for SteamClient {
    async fn fetch_tagged(&self, tag: &str, limit: u32) -> Result<Vec<RawServer>, UpstreamError> {
        let filter = self.filter_for(tag);
        let limit = limit.to_string();
        debug!("Querying upstream server list with filter {} (limit {})", filter, limit);

        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("filter", filter.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        info!("Upstream responded with status {}", status);
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = response.bytes().await.map_err(|e| self.map_transport(e))?;
        let servers = decode_server_list(&body)?;
        debug!("Upstream listed {} servers", servers.len());
        Ok(servers)
    }
}
