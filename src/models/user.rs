use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub pk: i64,
    pub username: String,
}

/// A feed a user follows, projected down to what the `GET /v1.0/users/` route
/// needs (`{username, followed_feeds: [{title, link}]}`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FollowedFeed {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithFeeds {
    pub username: String,
    pub followed_feeds: Vec<FollowedFeed>,
}
