use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/canary/", get(canary))
}

/// GET /v1.0/canary/ - liveness check
async fn canary() -> StatusCode {
    StatusCode::OK
}
