use axum::{
    extract::{Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::OrderByLastUpdate;
use crate::errors::{AppError, AppResult};
use crate::models::{Feed, Posting};
use crate::AppState;

/// DTO-layer length check shared by every route that accepts a `link` field,
/// matching the original ORM's `@validates` hook (spec: length >= 4).
fn validate_link(link: &str) -> Result<(), AppError> {
    if link.trim().len() < 4 {
        return Err(AppError::ValidationError(
            "link must be at least 4 characters".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub username: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub feed: Feed,
}

#[derive(Debug, Deserialize)]
pub struct PostingActionRequest {
    pub username: String,
    pub link: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterPostingsQuery {
    pub username: String,
    pub feed_link: Option<String>,
    pub is_read: Option<bool>,
    #[serde(default)]
    pub order_by: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PostingsResponse {
    pub postings: Vec<Posting>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/feeds/follow", post(follow))
        .route("/feeds/unfollow", delete(unfollow))
        .route("/feeds/postings/read", patch(mark_read))
        .route("/feeds/postings/unread", patch(mark_unread))
        .route("/feeds/following/postings", get(filter_postings))
        .route("/feeds/feed/force-update", post(force_update))
}

/// POST /v1.0/feeds/follow - follow a feed, fetching it first if new
async fn follow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FollowRequest>,
) -> AppResult<Json<FollowResponse>> {
    validate_link(&body.link)?;
    let feed = state.follow_service.follow(&body.username, &body.link).await?;
    Ok(Json(FollowResponse { feed }))
}

/// DELETE /v1.0/feeds/unfollow - unfollow a feed and clear its read history
async fn unfollow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FollowRequest>,
) -> AppResult<()> {
    validate_link(&body.link)?;
    state.follow_service.unfollow(&body.username, &body.link).await
}

/// PATCH /v1.0/feeds/postings/read - mark a posting read
async fn mark_read(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PostingActionRequest>,
) -> AppResult<()> {
    validate_link(&body.link)?;
    state
        .follow_service
        .mark_read(&body.username, &body.link)
        .await
}

/// PATCH /v1.0/feeds/postings/unread - mark a posting unread
async fn mark_unread(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PostingActionRequest>,
) -> AppResult<()> {
    validate_link(&body.link)?;
    state
        .follow_service
        .mark_unread(&body.username, &body.link)
        .await
}

/// GET /v1.0/feeds/following/postings - list postings for feeds a user follows
async fn filter_postings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterPostingsQuery>,
) -> AppResult<Json<PostingsResponse>> {
    let order = OrderByLastUpdate::parse(query.order_by.as_deref().unwrap_or("-last_update"));
    let postings = state
        .follow_service
        .filter_postings(
            &query.username,
            query.feed_link.as_deref(),
            query.is_read,
            order,
            query.offset.unwrap_or(0),
            query.limit.unwrap_or(10),
        )
        .await?;
    Ok(Json(PostingsResponse { postings }))
}

/// POST /v1.0/feeds/feed/force-update - re-fetch a feed immediately
async fn force_update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FollowRequest>,
) -> AppResult<()> {
    validate_link(&body.link)?;
    state
        .follow_service
        .force_update(&body.username, &body.link)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_link_rejects_short_links() {
        assert!(validate_link("htt").is_err());
        assert!(validate_link("http").is_ok());
    }
}
