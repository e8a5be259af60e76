use super::Store;
use crate::models::posting::Posting;

/// `order_by` values accepted by `filter_postings`, matching the HTTP query
/// parameter's two literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderByLastUpdate {
    LastUpdateAscending,
    LastUpdateDescending,
}

impl OrderByLastUpdate {
    pub fn parse(value: &str) -> Self {
        match value {
            "last_update" => OrderByLastUpdate::LastUpdateAscending,
            _ => OrderByLastUpdate::LastUpdateDescending,
        }
    }
}

impl Store {
    pub async fn get_posting_by_link(&self, link: &str) -> Result<Option<Posting>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM postings WHERE link = ?")
            .bind(link)
            .fetch_optional(&self.pool)
            .await
    }

    /// Conflict-ignore insert into the read relation.
    pub async fn mark_read(&self, user_pk: i64, posting_pk: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO read_postings (user_pk, posting_pk) VALUES (?, ?) \
             ON CONFLICT(user_pk, posting_pk) DO NOTHING",
        )
        .bind(user_pk)
        .bind(posting_pk)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the read row for a single `(user_pk, posting_pk)` pair. Scoped
    /// by user, correcting the likely defect documented in SPEC_FULL.md §9
    /// where the original deleted every user's read row for the posting link.
    pub async fn mark_unread(&self, user_pk: i64, posting_pk: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM read_postings WHERE user_pk = ? AND posting_pk = ?")
            .bind(user_pk)
            .bind(posting_pk)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_read(&self, user_pk: i64, posting_pk: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM read_postings WHERE user_pk = ? AND posting_pk = ?",
        )
        .bind(user_pk)
        .bind(posting_pk)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Postings restricted to feeds the user currently follows and that are
    /// active, optionally intersected with `feed_link`, optionally filtered by
    /// read-state, ordered by `updated_at`, paginated.
    pub async fn filter_postings(
        &self,
        user_pk: i64,
        feed_link: Option<&str>,
        is_read: Option<bool>,
        order: OrderByLastUpdate,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Posting>, sqlx::Error> {
        let order_clause = match order {
            OrderByLastUpdate::LastUpdateAscending => "ASC",
            OrderByLastUpdate::LastUpdateDescending => "DESC",
        };

        let read_clause = match is_read {
            Some(true) => {
                "AND p.pk IN (SELECT posting_pk FROM read_postings WHERE user_pk = ?1)"
            }
            Some(false) => {
                "AND p.pk NOT IN (SELECT posting_pk FROM read_postings WHERE user_pk = ?1)"
            }
            None => "",
        };

        let query = format!(
            r#"
            SELECT p.* FROM postings p
            INNER JOIN feeds f ON p.feed_id = f.pk
            INNER JOIN user_feed uf ON uf.feed_pk = f.pk AND uf.user_pk = ?1
            WHERE f.active = 1
              AND (?2 IS NULL OR f.link = ?2)
              {read_clause}
            ORDER BY p.updated_at {order_clause}
            LIMIT ?3 OFFSET ?4
            "#
        );

        sqlx::query_as(&query)
            .bind(user_pk)
            .bind(feed_link)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }
}
