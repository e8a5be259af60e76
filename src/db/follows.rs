use super::Store;

impl Store {
    /// Conflict-ignore insert into the follow relation.
    pub async fn follow(&self, user_pk: i64, feed_pk: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_feed (user_pk, feed_pk) VALUES (?, ?) \
             ON CONFLICT(user_pk, feed_pk) DO NOTHING",
        )
        .bind(user_pk)
        .bind(feed_pk)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the follow row and every read row the user holds for postings
    /// of that feed, in a single transaction.
    pub async fn unfollow(&self, user_pk: i64, feed_pk: i64) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_feed WHERE user_pk = ? AND feed_pk = ?")
            .bind(user_pk)
            .bind(feed_pk)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM read_postings
            WHERE user_pk = ?
              AND posting_pk IN (SELECT pk FROM postings WHERE feed_id = ?)
            "#,
        )
        .bind(user_pk)
        .bind(feed_pk)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    pub async fn is_following(&self, user_pk: i64, feed_pk: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM user_feed WHERE user_pk = ? AND feed_pk = ?")
                .bind(user_pk)
                .bind(feed_pk)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }
}
