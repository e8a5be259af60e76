mod canary;
mod feeds;
mod users;

use axum::Router;
use std::sync::Arc;
use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/v1.0",
        Router::new()
            .merge(canary::routes())
            .merge(users::routes())
            .merge(feeds::routes()),
    )
}
