// src/state.rs
use std::sync::atomic::{AtomicU64, Ordering};
use crate::refresh::ServerListService;

/// Shared by every handler; constructed once at startup.
pub struct AppState {
    pub servers: ServerListService,
    pub join_url_template: String,
    request_counter: AtomicU64,
}

impl AppState {
    pub fn new(servers: ServerListService, join_url_template: impl Into<String>) -> Self {
        Self {
            servers,
            join_url_template: join_url_template.into(),
            request_counter: AtomicU64::new(0),
        }
    }

    /// Count a server list request and return its id.
    pub fn next_request_id(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn total_requests(&self) -> u64 {
        self.request_counter.load(Ordering::Relaxed)
    }
}
