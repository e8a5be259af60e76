//! Persistent relational state: users, feeds, postings, and the two junction
//! relations (follow, read). `Store` owns the connection pool; individual
//! operations are implemented in sibling modules as `impl Store` blocks, split
//! by entity the way the teacher splits its own `db/` modules.

mod feeds;
mod follows;
mod postings;
mod users;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

pub use feeds::*;
pub use follows::*;
pub use postings::*;
pub use users::*;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if necessary) the SQLite database at `database_url` and
    /// run schema setup. Mirrors the "migrate on open, no external migration
    /// runner" shape used elsewhere in this codebase's lineage for embedded
    /// SQLite stores.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .pragma("busy_timeout", "5000")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Opens an ephemeral in-memory database. Used by unit tests colocated in
    /// this crate and by the integration tests under `tests/`.
    pub async fn connect_in_memory() -> Result<Self, sqlx::Error> {
        Self::connect("sqlite::memory:").await
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feeds (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                link TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                lang TEXT NOT NULL,
                copyright_text TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS postings (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                link TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                author TEXT NOT NULL,
                published_at TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                feed_id INTEGER NOT NULL REFERENCES feeds(pk) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_feed (
                user_pk INTEGER NOT NULL REFERENCES users(pk) ON DELETE CASCADE,
                feed_pk INTEGER NOT NULL REFERENCES feeds(pk) ON DELETE CASCADE,
                PRIMARY KEY (user_pk, feed_pk)
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS read_postings (
                user_pk INTEGER NOT NULL REFERENCES users(pk) ON DELETE CASCADE,
                posting_pk INTEGER NOT NULL REFERENCES postings(pk) ON DELETE CASCADE,
                PRIMARY KEY (user_pk, posting_pk)
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}
