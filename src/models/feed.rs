use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A syndication source identified by its `link`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feed {
    pub pk: i64,
    pub link: String,
    pub title: String,
    pub lang: String,
    pub copyright_text: String,
    pub description: String,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Lightweight projection used by the Scheduler, which needs nothing but the
/// identity of each active feed.
#[derive(Debug, Clone)]
pub struct ActiveFeed {
    pub pk: i64,
    pub link: String,
}

/// Normalised, in-memory representation of a feed produced by the Fetcher and
/// consumed by the Ingestor. Not persisted directly; discarded after ingestion.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub link: String,
    pub title: String,
    pub lang: String,
    pub copyright_text: String,
    pub description: String,
    pub category: String,
}
