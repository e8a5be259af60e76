use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::FromRow;

/// An individual item inside a feed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Posting {
    pub pk: i64,
    pub link: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub feed_id: i64,
}

/// Normalised, in-memory representation of one feed entry produced by the
/// Fetcher and consumed by the Ingestor.
#[derive(Debug, Clone)]
pub struct PostingSnapshot {
    pub link: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
}
