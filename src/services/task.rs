//! Per-feed retry/backoff state machine. A Task owns one feed's lifecycle for
//! a single Scheduler sweep: up to three fetch attempts, with a deactivate-then
//! sleep response to each failure, stopping the feed deactivated if every
//! attempt fails.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::db::Store;
use crate::services::fetcher::Fetcher;
use crate::services::ingestor::ingest;

/// Backoff delays in seconds for attempts 2 and 3, and the trailing sleep
/// after attempt 3 fails. Verbatim from the original scheduler's
/// `range(2, 9, 3)` minute schedule.
const BACKOFF_SECS: [u64; 3] = [120, 300, 480];

/// Outcome of racing one `ingest()` attempt against cancellation.
enum AttemptOutcome {
    /// Fetch and upsert both succeeded; carries the feed's pk.
    Success(i64),
    /// The Fetcher failed; the Store was never touched.
    FetchFailure,
    /// The Fetcher succeeded but the Store upsert itself failed. Distinct
    /// from `FetchFailure` so the caller can stop without retrying instead
    /// of treating a transient DB error like a dead feed.
    StoreError(sqlx::Error),
    /// Cancelled while the fetch/upsert was in flight.
    Cancelled,
}

/// Runs a feed's fetch-retry lifecycle to completion.
///
/// On the first successful attempt the feed is (re-)activated and ingested;
/// the task returns immediately. If all three attempts fail on Fetcher
/// errors, the feed is left deactivated. A Store error terminates the Task
/// immediately, leaving the feed's activation state exactly as it was at the
/// point of failure, and is propagated as an error rather than swallowed.
/// `cancel` lets a Scheduler shutdown interrupt a Task mid-sleep or mid-fetch
/// instead of leaving it to run to completion.
pub struct Task {
    store: Store,
    fetcher: Fetcher,
    feed_pk: i64,
    link: String,
    cancel: CancellationToken,
}

impl Task {
    pub fn new(store: Store, fetcher: Fetcher, feed_pk: i64, link: String, cancel: CancellationToken) -> Self {
        Self {
            store,
            fetcher,
            feed_pk,
            link,
            cancel,
        }
    }

    /// Runs the retry loop. Returns `Ok(true)` if the feed was successfully
    /// ingested, `Ok(false)` if every attempt failed on a Fetcher error (feed
    /// left inactive) or the task was cancelled, and `Err` if the Store
    /// itself failed — the Scheduler logs this and continues sweeping.
    pub async fn run(self) -> Result<bool, sqlx::Error> {
        for attempt in 0..3 {
            if attempt > 0 {
                let slept = self.sleep_or_cancelled(BACKOFF_SECS[attempt - 1]).await;
                if !slept {
                    return Ok(false);
                }
            }

            match self.ingest_or_cancelled().await {
                AttemptOutcome::Success(_) => {
                    if let Err(err) = self.store.set_feed_active(self.feed_pk, true).await {
                        tracing::error!(feed_pk = self.feed_pk, error = %err, "task: failed to reactivate feed");
                        return Err(err);
                    }
                    return Ok(true);
                }
                AttemptOutcome::FetchFailure => {
                    if attempt == 0 {
                        if let Err(err) = self.store.set_feed_active(self.feed_pk, false).await {
                            tracing::error!(feed_pk = self.feed_pk, error = %err, "task: failed to deactivate feed");
                            return Err(err);
                        }
                    }
                }
                AttemptOutcome::StoreError(err) => {
                    tracing::error!(feed_pk = self.feed_pk, link = %self.link, error = %err, "task: store upsert failed, aborting without retry");
                    return Err(err);
                }
                AttemptOutcome::Cancelled => {
                    tracing::info!(link = %self.link, "task: cancelled during fetch");
                    return Ok(false);
                }
            }
        }

        // Final backoff after the third failed attempt contributes nothing —
        // preserved to match the original's literal behaviour (spec's Open
        // Question on this point permits, but does not require, dropping it).
        self.sleep_or_cancelled(BACKOFF_SECS[2]).await;
        Ok(false)
    }

    /// Races one `ingest()` attempt (fetch + upsert) against cancellation, so
    /// a shutdown mid-fetch doesn't block the Scheduler's `JoinSet` drain on
    /// the Fetcher's transport timeout.
    async fn ingest_or_cancelled(&self) -> AttemptOutcome {
        tokio::select! {
            result = ingest(&self.store, &self.fetcher, &self.link) => match result {
                Ok(Some(pk)) => AttemptOutcome::Success(pk),
                Ok(None) => AttemptOutcome::FetchFailure,
                Err(err) => AttemptOutcome::StoreError(err),
            },
            _ = self.cancel.cancelled() => AttemptOutcome::Cancelled,
        }
    }

    /// Sleeps `secs`, racing against cancellation. Returns `false` if
    /// cancelled first.
    async fn sleep_or_cancelled(&self, secs: u64) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(secs)) => true,
            _ = self.cancel.cancelled() => {
                tracing::info!(link = %self.link, "task: cancelled during backoff");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let store = Store::connect_in_memory().await.unwrap();
        store
            .upsert_feed_with_postings(
                &crate::models::feed::FeedSnapshot {
                    link: "http://127.0.0.1:1/dead".to_string(),
                    title: "-".to_string(),
                    lang: "-".to_string(),
                    copyright_text: "-".to_string(),
                    description: "-".to_string(),
                    category: "-".to_string(),
                },
                &[],
            )
            .await
            .unwrap();
        let feed = store
            .get_feed_by_link("http://127.0.0.1:1/dead")
            .await
            .unwrap()
            .unwrap();

        let cancel = CancellationToken::new();
        let task = Task::new(
            store.clone(),
            Fetcher::new(),
            feed.pk,
            feed.link.clone(),
            cancel.clone(),
        );

        let handle = tokio::spawn(task.run());
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        let completed = handle.await.unwrap().unwrap();
        assert!(!completed);
    }
}
