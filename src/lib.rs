//! Library interface for the feed aggregator, split out from `main.rs` so
//! integration tests under `tests/` can exercise the Store, Fetcher,
//! Ingestor, Task, Scheduler, and FollowService directly.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

pub struct AppState {
    pub store: db::Store,
    pub follow_service: services::FollowService,
}

pub type SharedState = Arc<AppState>;
