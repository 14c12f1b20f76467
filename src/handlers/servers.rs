// src/handlers/servers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};
use crate::models::server::ServerInfo;
use crate::refresh::ServeOutcome;
use crate::state::AppState;
use crate::utils::{client_ip, format_age, log_all_headers, user_agent, ApiError};

#[derive(Debug, Deserialize)]
pub struct ServersQuery {
    refresh: Option<String>,
}

impl ServersQuery {
    fn force_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerListBody<'a> {
    pub servers: &'a [ServerInfo],
    pub is_mock_data: bool,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error_fallback: Option<bool>,
    pub request_id: u64,
}

pub async fn get_servers(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ServersQuery>,
) -> Result<HttpResponse, ApiError> {
    let request_id = state.next_request_id();
    info!("[{}] Server request from {}", request_id, client_ip(&req));
    info!("[{}] User-Agent: {}", request_id, user_agent(&req));
    log_all_headers(&req);

    let listing = state.servers.serve(query.force_refresh()).await?;

    let cache_age = match listing.outcome {
        ServeOutcome::CacheHit { age } => {
            info!("[{}] Returning cached server data (age: {})", request_id, format_age(age));
            Some(format_age(age))
        }
        ServeOutcome::Refreshed => {
            info!(
                "[{}] Returning {} freshly fetched servers{}",
                request_id,
                listing.servers.len(),
                if listing.is_synthetic { " (placeholder data)" } else { "" }
            );
            None
        }
        ServeOutcome::ErrorFallback { age } => {
            info!("[{}] Returning stale cached data after upstream error", request_id);
            age.map(format_age)
        }
    };

    Ok(HttpResponse::Ok().json(ServerListBody {
        servers: &listing.servers,
        is_mock_data: listing.is_synthetic,
        from_cache: listing.from_cache(),
        cache_age,
        is_error_fallback: listing.is_error_fallback().then_some(true),
        request_id,
    }))
}
