// src/handlers/debug.rs
use actix_web::{web, HttpResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use serde_json::json;
use std::time::{Instant, UNIX_EPOCH};
use crate::state::AppState;
use crate::utils::format_age;

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn request_stats(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.servers.cache().get();

    HttpResponse::Ok().json(json!({
        "totalRequests": state.total_requests(),
        "currentTime": iso(Utc::now()),
        "cacheStatus": {
            "exists": snapshot.exists(),
            "age": snapshot.age(Instant::now()).map(format_age),
            "serverCount": snapshot.server_count(),
        },
    }))
}

pub async fn cache_status(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.servers.cache().get();
    let timestamp = snapshot
        .fetched_at_utc
        .unwrap_or_else(|| DateTime::<Utc>::from(UNIX_EPOCH));

    HttpResponse::Ok().json(json!({
        "cacheExists": snapshot.exists(),
        "cacheAge": snapshot.age(Instant::now()).map(format_age),
        "isMockData": snapshot.is_synthetic,
        "serverCount": snapshot.server_count(),
        "timestamp": iso(timestamp),
    }))
}

pub async fn clear_cache(state: web::Data<AppState>) -> HttpResponse {
    state.servers.cache().clear();
    info!("Server cache cleared");

    HttpResponse::Ok().json(json!({ "message": "Cache cleared successfully" }))
}
