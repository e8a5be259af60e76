use super::Store;
use crate::models::user::{FollowedFeed, User, UserWithFeeds};

impl Store {
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_user_by_pk(&self, pk: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE pk = ?")
            .bind(pk)
            .fetch_optional(&self.pool)
            .await
    }

    /// Inserts a new user. On a unique-violation on `username`, the caller
    /// gets back `sqlx::Error::Database` and maps it to `AppError::AlreadyExists`.
    pub async fn create_user(&self, username: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as("INSERT INTO users (username) VALUES (?) RETURNING *")
            .bind(username)
            .fetch_one(&self.pool)
            .await
    }

    /// Users with their followed feeds eagerly loaded, paginated.
    pub async fn list_users(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserWithFeeds>, sqlx::Error> {
        let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY pk LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut result = Vec::with_capacity(users.len());
        for user in users {
            let followed_feeds: Vec<FollowedFeed> = sqlx::query_as(
                r#"
                SELECT f.title, f.link FROM feeds f
                INNER JOIN user_feed uf ON uf.feed_pk = f.pk
                WHERE uf.user_pk = ?
                "#,
            )
            .bind(user.pk)
            .fetch_all(&self.pool)
            .await?;

            result.push(UserWithFeeds {
                username: user.username,
                followed_feeds,
            });
        }

        Ok(result)
    }
}
