// src/handlers/join.rs
use actix_web::{web, HttpResponse};
use log::debug;
use serde_json::json;
use crate::state::AppState;

/// Launch URL for `address`. The address is substituted as given.
pub fn join_url(template: &str, address: &str) -> String {
    template.replace("{address}", address)
}

pub async fn get_join_url(state: web::Data<AppState>, address: web::Path<String>) -> HttpResponse {
    let join_url = join_url(&state.join_url_template, &address);
    debug!("Join URL for {}: {}", address, join_url);
    HttpResponse::Ok().json(json!({ "joinUrl": join_url }))
}
