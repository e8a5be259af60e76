//! User-scoped operations over Store: follow/unfollow, read/unread, filtered
//! listing, and force-update. Thin orchestration layer between the HTTP
//! handlers and the Store/Ingestor; holds no state of its own.

use crate::db::OrderByLastUpdate;
use crate::errors::{AppError, AppResult};
use crate::models::{Feed, Posting, User};
use crate::services::fetcher::Fetcher;
use crate::services::ingestor::ingest;

use crate::db::Store;

#[derive(Clone)]
pub struct FollowService {
    store: Store,
    fetcher: Fetcher,
}

impl FollowService {
    pub fn new(store: Store, fetcher: Fetcher) -> Self {
        Self { store, fetcher }
    }

    /// Idempotent: if the user already follows a feed at `link`, returns it
    /// unchanged without re-fetching. Otherwise fetches and ingests `link`
    /// before recording the follow.
    pub async fn follow(&self, username: &str, link: &str) -> AppResult<Feed> {
        let user = self.require_user(username).await?;

        if let Some(feed) = self.store.get_feed_by_link(link).await? {
            if self.store.is_following(user.pk, feed.pk).await? {
                return Ok(feed);
            }
        }

        let feed_pk = ingest(&self.store, &self.fetcher, link)
            .await?
            .ok_or_else(|| AppError::FetchFailure(link.to_string()))?;

        // A successful ingest always reactivates the feed, even if a prior
        // Task had deactivated it after exhausting its retries.
        self.store.set_feed_active(feed_pk, true).await?;
        self.store.follow(user.pk, feed_pk).await?;

        self.store
            .get_feed_by_pk(feed_pk)
            .await?
            .map(|(feed, _)| feed)
            .ok_or_else(|| AppError::Internal("feed vanished after upsert".to_string()))
    }

    /// Removes the follow relation and every read row the user holds for that
    /// feed's postings, in one Store transaction.
    pub async fn unfollow(&self, username: &str, link: &str) -> AppResult<()> {
        let user = self.require_user(username).await?;
        let feed = self
            .store
            .get_feed_by_link(link)
            .await?
            .ok_or_else(|| AppError::NotFound(link.to_string()))?;

        self.store.unfollow(user.pk, feed.pk).await?;
        Ok(())
    }

    /// Requires the user to currently follow the posting's feed.
    pub async fn mark_read(&self, username: &str, posting_link: &str) -> AppResult<()> {
        let user = self.require_user(username).await?;
        let posting = self
            .store
            .get_posting_by_link(posting_link)
            .await?
            .ok_or_else(|| AppError::NotFound(posting_link.to_string()))?;

        if !self.store.is_following(user.pk, posting.feed_id).await? {
            return Err(AppError::NotAllowed(format!(
                "{username} does not follow the feed for {posting_link}"
            )));
        }

        self.store.mark_read(user.pk, posting.pk).await?;
        Ok(())
    }

    /// Scoped to the calling user only — see the module-level note in
    /// `db::postings::mark_unread`.
    pub async fn mark_unread(&self, username: &str, posting_link: &str) -> AppResult<()> {
        let user = self.require_user(username).await?;
        let posting = self
            .store
            .get_posting_by_link(posting_link)
            .await?
            .ok_or_else(|| AppError::NotFound(posting_link.to_string()))?;

        self.store.mark_unread(user.pk, posting.pk).await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn filter_postings(
        &self,
        username: &str,
        feed_link: Option<&str>,
        is_read: Option<bool>,
        order: OrderByLastUpdate,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Posting>> {
        let user = self.require_user(username).await?;
        let postings = self
            .store
            .filter_postings(user.pk, feed_link, is_read, order, offset, limit)
            .await?;
        Ok(postings)
    }

    /// Re-ingests `link` regardless of whether it is already followed, then
    /// records the follow (conflict-ignore) for the calling user.
    pub async fn force_update(&self, username: &str, link: &str) -> AppResult<()> {
        let user = self.require_user(username).await?;

        let feed_pk = ingest(&self.store, &self.fetcher, link)
            .await?
            .ok_or_else(|| AppError::FetchFailure(link.to_string()))?;

        // A force-update is explicitly required to reactivate a previously
        // deactivated feed (see SPEC_FULL.md §9).
        self.store.set_feed_active(feed_pk, true).await?;
        self.store.follow(user.pk, feed_pk).await?;
        Ok(())
    }

    async fn require_user(&self, username: &str) -> AppResult<User> {
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(username.to_string()))
    }
}
