//! Background sweep loop. Once per `interval`, lists every active feed and
//! spawns a [`Task`] per feed, running them concurrently and tracking them in
//! a `JoinSet` so a shutdown can drain in-flight Tasks without blocking the
//! next sweep on stragglers.

use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::db::Store;
use crate::services::fetcher::Fetcher;
use crate::services::task::Task;

pub struct Scheduler {
    store: Store,
    fetcher: Fetcher,
    interval: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(store: Store, fetcher: Fetcher, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            store,
            fetcher,
            interval,
            cancel,
        }
    }

    /// Runs sweeps until cancelled. Each sweep lists active feeds, spawns a
    /// Task per feed, and logs (but does not abort on) individual Task
    /// failures. On cancellation, already-spawned Tasks are drained before
    /// returning.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        let mut tasks: JoinSet<Result<bool, sqlx::Error>> = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep(&mut tasks).await;
                }
                _ = self.cancel.cancelled() => {
                    tracing::info!("scheduler: shutdown requested, draining in-flight tasks");
                    while let Some(result) = tasks.join_next().await {
                        Self::log_task_result(result);
                    }
                    return;
                }
            }
        }
    }

    async fn sweep(&self, tasks: &mut JoinSet<Result<bool, sqlx::Error>>) {
        let feeds = match self.store.list_active_feeds().await {
            Ok(feeds) => feeds,
            Err(err) => {
                tracing::error!(error = %err, "scheduler: failed to list active feeds");
                return;
            }
        };

        tracing::debug!(count = feeds.len(), "scheduler: sweep starting");

        for feed in feeds {
            let task = Task::new(
                self.store.clone(),
                self.fetcher.clone(),
                feed.pk,
                feed.link,
                self.cancel.clone(),
            );
            tasks.spawn(async move { task.run().await });
        }

        // Reap any tasks from prior sweeps that have already finished, so the
        // JoinSet doesn't grow unbounded across a long-running process. Store
        // failures propagated from a Task are logged here and the sweep loop
        // continues, per the Task/Scheduler failure-propagation contract.
        while let Some(result) = tasks.try_join_next() {
            Self::log_task_result(result);
        }
    }

    fn log_task_result(result: Result<Result<bool, sqlx::Error>, tokio::task::JoinError>) {
        match result {
            Ok(Err(err)) => {
                tracing::error!(error = %err, "scheduler: task terminated on store failure");
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "scheduler: task panicked");
            }
            Ok(Ok(_)) => {}
        }
    }
}
