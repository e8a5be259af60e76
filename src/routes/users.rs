use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::models::user::UserWithFeeds;
use crate::models::User;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/", get(list_users).post(create_user))
}

/// GET /v1.0/users/?offset&limit - users with their followed feeds
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<Vec<UserWithFeeds>>> {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(100);
    let users = state.store.list_users(offset, limit).await?;
    Ok(Json(users))
}

/// POST /v1.0/users/ - create a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let username = body.username.trim();
    if username.len() < 3 {
        return Err(AppError::ValidationError(
            "username must be at least 3 characters".to_string(),
        ));
    }

    let user = state.store.create_user(username).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
