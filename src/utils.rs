// src/utils.rs
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use log::{debug, error};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use crate::refresh::RefreshError;

#[derive(Debug)]
pub enum ApiError {
    ServerListUnavailable(RefreshError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerListUnavailable(_) => write!(f, "Error fetching servers"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerListUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            Self::ServerListUnavailable(e) => {
                error!("Server list request failed: {}", e);
                e.to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string(),
            "error": detail,
        }))
    }
}

impl From<RefreshError> for ApiError {
    fn from(e: RefreshError) -> Self {
        Self::ServerListUnavailable(e)
    }
}

/// Best-effort client address for logging: first X-Forwarded-For hop, else the peer.
pub fn client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(value) = forwarded_for.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn user_agent(req: &HttpRequest) -> &str {
    req.headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

// For debugging purposes
pub fn log_all_headers(req: &HttpRequest) {
    debug!("All request headers:");
    for (name, value) in req.headers() {
        debug!("{}: {:?}", name, value);
    }
}

/// Cache age as shown to clients, e.g. `"42 seconds"`.
pub fn format_age(age: Duration) -> String {
    format!("{} seconds", (age.as_millis() as f64 / 1000.0).round() as u64)
}
