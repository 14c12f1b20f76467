// src/handlers/index.rs
use actix_web::HttpResponse;
use serde_json::json;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "TrueQuickplay API is running",
    }))
}
