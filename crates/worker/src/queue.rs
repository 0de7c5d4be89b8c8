//! Producer side of the Postgres-backed work queue.

use chrono::Utc;
use vlogcrew_core::input::JobInput;
use vlogcrew_db::models::queue::QueueItem;
use vlogcrew_db::repositories::{EventRepo, JobRepo, QueueRepo};
use vlogcrew_db::DbPool;

/// Event text written when a job is accepted.
pub const QUEUED_EVENT: &str = "Job queued";

#[derive(Debug, thiserror::Error)]
pub enum EnqueueError {
    #[error("Job {0} already exists")]
    Duplicate(String),

    #[error("Failed to encode job input: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the job in `STARTED`, log `"Job queued"` and push the work item.
///
/// All three writes share one transaction: a reader either sees the
/// queued job with its first event or nothing at all.
pub async fn enqueue_job(
    pool: &DbPool,
    job_id: &str,
    input: &JobInput,
) -> Result<QueueItem, EnqueueError> {
    let payload = serde_json::to_value(input)?;

    let mut tx = pool.begin().await?;
    if !JobRepo::insert_if_absent(&mut *tx, job_id).await? {
        return Err(EnqueueError::Duplicate(job_id.to_string()));
    }
    EventRepo::insert(&mut *tx, job_id, Utc::now(), QUEUED_EVENT).await?;
    let item = QueueRepo::enqueue(&mut *tx, job_id, &payload).await?;
    tx.commit().await?;

    tracing::info!(job_id, item_id = item.id, "Job enqueued");
    Ok(item)
}

/// Decode a claimed item's payload back into the pipeline input.
pub fn decode_payload(item: &QueueItem) -> Result<JobInput, serde_json::Error> {
    serde_json::from_value(item.payload.clone())
}
