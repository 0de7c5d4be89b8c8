//! Consumer side of the work queue.
//!
//! Polls every `poll_interval` and claims items with
//! [`QueueRepo::claim_next`] (`FOR UPDATE SKIP LOCKED`) while fewer than
//! `concurrency` jobs are in flight.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use vlogcrew_core::status::JobStatus;
use vlogcrew_db::models::queue::QueueItem;
use vlogcrew_db::repositories::QueueRepo;
use vlogcrew_db::DbPool;
use vlogcrew_events::JobStore;
use vlogcrew_pipeline::Pipeline;

use crate::config::WorkerConfig;
use crate::execute::{run_job, FAILED_EVENT};
use crate::queue::decode_payload;

/// Long-lived queue consumer.
#[derive(Clone)]
pub struct QueueWorker {
    pool: DbPool,
    store: JobStore,
    pipeline: Pipeline,
    name: String,
    concurrency: usize,
    poll_interval: Duration,
}

impl QueueWorker {
    pub fn new(pool: DbPool, pipeline: Pipeline, config: &WorkerConfig) -> Self {
        Self {
            store: JobStore::new(pool.clone()),
            pool,
            pipeline,
            name: config.name.clone(),
            concurrency: config.concurrency.max(1),
            poll_interval: config.poll_interval,
        }
    }

    /// Run the polling loop until `cancel` fires, then wait for in-flight
    /// jobs to finish.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        let mut in_flight = JoinSet::new();
        tracing::info!(
            worker = %self.name,
            concurrency = self.concurrency,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Queue worker started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(worker = %self.name, "Queue worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.fill(&mut in_flight).await;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Job task failed to join");
                    }
                }
            }
        }

        let remaining = in_flight.len();
        if remaining > 0 {
            tracing::info!(remaining, "Waiting for in-flight jobs");
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Job task failed to join");
            }
        }
        tracing::info!(worker = %self.name, "Queue worker stopped");
    }

    /// Claim items until the queue is empty or the concurrency limit is hit.
    async fn fill(&self, in_flight: &mut JoinSet<()>) {
        while in_flight.len() < self.concurrency {
            match QueueRepo::claim_next(&self.pool, &self.name).await {
                Ok(Some(item)) => {
                    let worker = self.clone();
                    in_flight.spawn(async move { worker.process(item).await });
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to claim queue item");
                    break;
                }
            }
        }
    }

    /// Claim and run a single item inline.
    ///
    /// Returns the job ID, or `None` when the queue is empty.
    pub async fn run_next(&self) -> Result<Option<String>, sqlx::Error> {
        let Some(item) = QueueRepo::claim_next(&self.pool, &self.name).await? else {
            return Ok(None);
        };
        let job_id = item.job_id.clone();
        self.process(item).await;
        Ok(Some(job_id))
    }

    async fn process(&self, item: QueueItem) {
        tracing::info!(job_id = %item.job_id, item_id = item.id, worker = %self.name, "Job claimed");

        match decode_payload(&item) {
            Ok(input) => {
                run_job(&self.store, &self.pipeline, &item.job_id, input).await;
            }
            Err(e) => {
                tracing::error!(job_id = %item.job_id, error = %e, "Undecodable queue payload");
                self.store
                    .update_job(
                        &item.job_id,
                        JobStatus::Error,
                        &format!("Invalid job input: {e}"),
                        &[FAILED_EVENT],
                    )
                    .await;
            }
        }

        if let Err(e) = QueueRepo::mark_finished(&self.pool, item.id).await {
            tracing::error!(item_id = item.id, error = %e, "Failed to mark queue item finished");
        }
    }
}
