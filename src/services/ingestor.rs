//! Composes [`Fetcher`] + [`Store`]: upserts a feed and its postings
//! atomically under the feed's URL identity. Used by both the Scheduler (via
//! Task) and the force-update HTTP path.

use crate::db::Store;
use crate::services::fetcher::Fetcher;

/// Fetches `link` and, on success, upserts it into the Store.
///
/// `Ok(None)` means the Fetcher failed (transport, HTTP status, or parse) —
/// the Store was never touched. `Err` means the Fetcher succeeded but the
/// Store upsert itself failed; callers must not treat this the same as a
/// Fetcher failure (see `Task::run` and `FollowService`).
pub async fn ingest(store: &Store, fetcher: &Fetcher, link: &str) -> Result<Option<i64>, sqlx::Error> {
    let Ok((feed, postings)) = fetcher.fetch(link).await else {
        return Ok(None);
    };
    let pk = store.upsert_feed_with_postings(&feed, &postings).await?;
    Ok(Some(pk))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ingest_returns_none_on_fetch_failure() {
        let store = Store::connect_in_memory().await.unwrap();
        let fetcher = Fetcher::new();
        // Nothing is listening on this port; the GET will fail to connect.
        let result = ingest(&store, &fetcher, "http://127.0.0.1:1/does-not-exist").await.unwrap();
        assert!(result.is_none());
    }
}
