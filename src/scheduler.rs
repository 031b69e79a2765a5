use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::configuration::SchedulerSettings;
use crate::domain::post::{
    errors::PostError,
    ports::{PostService, Publication},
};

/// Counts for one sweep over the due posts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Background driver that publishes scheduled posts once their send time has come.
pub struct PostPublisher<PS>
where
    PS: PostService,
{
    posts: Arc<PS>,
    interval: Duration,
    sweep_timeout: Duration,
}

/// Running publisher. Dropping it also ends the loop, without waiting for it.
pub struct PublisherHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PublisherHandle {
    /// Stop issuing sweeps and wait for the loop to exit. A sweep in flight runs
    /// to completion or to its timeout.
    pub async fn stop(self) {
        tracing::info!("Stopping scheduled post publisher");
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            tracing::error!(error.cause_chain = ?e, "Scheduled post publisher task failed");
        }
    }
}

impl<PS> PostPublisher<PS>
where
    PS: PostService,
{
    pub fn new(posts: Arc<PS>, settings: &SchedulerSettings) -> Self {
        Self {
            posts,
            interval: settings.interval(),
            sweep_timeout: settings.sweep_timeout(),
        }
    }

    /// Spawn the loop on the current runtime. The first sweep runs right away.
    pub fn start(self) -> PublisherHandle {
        tracing::info!(
            interval_seconds = self.interval.as_secs(),
            "Starting scheduled post publisher"
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));
        PublisherHandle { shutdown_tx, join }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::info!("Scheduled post publisher stopped");
    }

    async fn tick(&self) {
        match tokio::time::timeout(self.sweep_timeout, self.sweep(Utc::now())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to fetch scheduled posts"
                );
            }
            Err(_) => {
                tracing::warn!(
                    timeout_seconds = self.sweep_timeout.as_secs(),
                    "Scheduled post sweep timed out"
                );
            }
        }
    }

    /// Publish every post due at `as_of`, one at a time. A failing post is logged
    /// and the sweep moves on.
    #[tracing::instrument(name = "Sweep scheduled posts", level = "debug", skip(self))]
    pub async fn sweep(&self, as_of: DateTime<Utc>) -> Result<SweepReport, PostError> {
        let due = self.posts.due_posts(as_of).await?;
        let mut report = SweepReport::default();
        if due.is_empty() {
            tracing::debug!("No scheduled posts due");
            return Ok(report);
        }
        tracing::info!(count = due.len(), "Found posts to publish");

        for post in due {
            match self.posts.publish(post.id).await {
                Ok(Publication::Published(_)) => {
                    report.published += 1;
                    tracing::info!(post_id = %post.id, "Published scheduled post");
                }
                Ok(Publication::AlreadyPublished) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        post_id = %post.id,
                        "Failed to publish scheduled post"
                    );
                }
            }
        }
        Ok(report)
    }
}
