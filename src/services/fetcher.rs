//! Feed fetching and parsing.
//!
//! Given a feed URL, performs a non-blocking HTTP GET, parses the response as
//! an RSS/Atom document, and yields a normalised [`FeedSnapshot`] plus its
//! [`PostingSnapshot`]s. All failure kinds — transport, HTTP status, parse —
//! collapse into one [`FetchError`]; callers above this module never see the
//! underlying error kind (per the ingestion pipeline's failure contract).

use feed_rs::parser;
use reqwest::Client;
use sqlx::types::chrono::Utc;
use std::time::Duration;

use crate::models::feed::FeedSnapshot;
use crate::models::posting::PostingSnapshot;

/// Placeholder used for any string field the upstream document omits.
const MISSING: &str = "-";

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(reqwest::StatusCode),
    Parse(feed_rs::parser::ParseFeedError),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "transport error: {e}"),
            FetchError::Status(s) => write!(f, "unexpected status: {s}"),
            FetchError::Parse(e) => write!(f, "parse error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(err)
    }
}

impl From<feed_rs::parser::ParseFeedError> for FetchError {
    fn from(err: feed_rs::parser::ParseFeedError) -> Self {
        FetchError::Parse(err)
    }
}

/// Fetches and parses RSS/Atom feeds over HTTP.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// 30 second transport timeout, matching the rest of this codebase's
    /// lineage of feed-fetching HTTP clients — bounded so a Task never blocks
    /// indefinitely on a dead upstream.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("feedkeep/1.0")
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Fetch `link`, returning a normalised snapshot of the feed and its
    /// postings. `link` itself becomes `FeedSnapshot.link`; any self-link
    /// discovered inside the document is ignored.
    pub async fn fetch(&self, link: &str) -> Result<(FeedSnapshot, Vec<PostingSnapshot>), FetchError> {
        let response = self.client.get(link).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let bytes = response.bytes().await?;

        let parsed = parser::parse(&bytes[..])?;

        let feed = FeedSnapshot {
            link: link.to_string(),
            title: parsed
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| MISSING.to_string()),
            lang: parsed.language.unwrap_or_else(|| MISSING.to_string()),
            copyright_text: parsed
                .rights
                .map(|r| r.content)
                .unwrap_or_else(|| MISSING.to_string()),
            description: parsed
                .description
                .map(|d| d.content)
                .unwrap_or_else(|| MISSING.to_string()),
            category: parsed
                .categories
                .first()
                .map(|c| c.term.clone())
                .unwrap_or_else(|| MISSING.to_string()),
        };

        let postings = parsed
            .entries
            .into_iter()
            .map(|entry| {
                let link = entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_else(|| MISSING.to_string());
                let title = entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| MISSING.to_string());
                let description = entry
                    .summary
                    .map(|s| s.content)
                    .unwrap_or_else(|| MISSING.to_string());
                let author = entry
                    .authors
                    .first()
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| MISSING.to_string());
                // REDESIGN: fall back to updated, then to now, rather than
                // propagating a missing timestamp as a whole-feed failure.
                let published_at = entry.published.or(entry.updated).unwrap_or_else(Utc::now);

                PostingSnapshot {
                    link,
                    title,
                    description,
                    author,
                    published_at,
                }
            })
            .collect();

        Ok((feed, postings))
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display() {
        let err = FetchError::Status(reqwest::StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("404"));
    }
}
