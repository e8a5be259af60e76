use super::Store;
use crate::models::feed::{ActiveFeed, Feed, FeedSnapshot};
use crate::models::posting::{Posting, PostingSnapshot};

impl Store {
    /// Insert-or-update a feed keyed by `link`, then insert-or-update each of
    /// its postings keyed by `link`. Single transaction; commits after all
    /// children. Returns the feed's primary key.
    pub async fn upsert_feed_with_postings(
        &self,
        feed: &FeedSnapshot,
        postings: &[PostingSnapshot],
    ) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let feed_pk: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO feeds (link, title, lang, copyright_text, description, category)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(link) DO UPDATE SET
                title = excluded.title,
                lang = excluded.lang,
                copyright_text = excluded.copyright_text,
                description = excluded.description,
                category = excluded.category
            RETURNING pk
            "#,
        )
        .bind(&feed.link)
        .bind(&feed.title)
        .bind(&feed.lang)
        .bind(&feed.copyright_text)
        .bind(&feed.description)
        .bind(&feed.category)
        .fetch_one(&mut *tx)
        .await?;

        for posting in postings {
            sqlx::query(
                r#"
                INSERT INTO postings (link, title, description, author, published_at, updated_at, feed_id)
                VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, ?)
                ON CONFLICT(link) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    author = excluded.author,
                    published_at = excluded.published_at,
                    updated_at = CURRENT_TIMESTAMP,
                    feed_id = excluded.feed_id
                "#,
            )
            .bind(&posting.link)
            .bind(&posting.title)
            .bind(&posting.description)
            .bind(&posting.author)
            .bind(posting.published_at)
            .bind(feed_pk)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(feed_pk)
    }

    /// Returns a feed with its postings eagerly loaded, or `None`.
    pub async fn get_feed_by_pk(&self, pk: i64) -> Result<Option<(Feed, Vec<Posting>)>, sqlx::Error> {
        let feed: Option<Feed> = sqlx::query_as("SELECT * FROM feeds WHERE pk = ?")
            .bind(pk)
            .fetch_optional(&self.pool)
            .await?;

        let Some(feed) = feed else {
            return Ok(None);
        };

        let postings: Vec<Posting> = sqlx::query_as("SELECT * FROM postings WHERE feed_id = ?")
            .bind(pk)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some((feed, postings)))
    }

    /// Feeds the Scheduler should dispatch a Task for this sweep.
    pub async fn list_active_feeds(&self) -> Result<Vec<ActiveFeed>, sqlx::Error> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT pk, link FROM feeds WHERE active = 1")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(pk, link)| ActiveFeed { pk, link })
            .collect())
    }

    /// Idempotent; no-op if the feed does not exist.
    pub async fn set_feed_active(&self, pk: i64, active: bool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE feeds SET active = ? WHERE pk = ?")
            .bind(active)
            .bind(pk)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_feed_by_link(&self, link: &str) -> Result<Option<Feed>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM feeds WHERE link = ?")
            .bind(link)
            .fetch_optional(&self.pool)
            .await
    }
}
