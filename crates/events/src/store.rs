//! The job status/event API.
//!
//! [`JobStore`] is a cheaply cloneable handle over the connection pool.
//! Every write runs in its own transaction, so a job never shows a status
//! change without the events written alongside it. Store failures are
//! logged and reported as absent/false results; they never panic or
//! propagate into the calling worker.

use chrono::Utc;
use vlogcrew_core::error::CoreError;
use vlogcrew_core::status::JobStatus;
use vlogcrew_db::models::job::JobSnapshot;
use vlogcrew_db::repositories::{EventRepo, JobRepo};
use vlogcrew_db::DbPool;

/// Result of [`JobStore::update_job`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Status, result and events were written.
    Updated,
    /// No job with that ID exists; nothing was written.
    NotFound,
    /// The transition from `current` is not allowed; nothing was written.
    Rejected { current: JobStatus },
    /// The store could not be reached or the write failed and was rolled back.
    Failed,
}

/// Handle to the job status and event tables.
#[derive(Clone)]
pub struct JobStore {
    pool: DbPool,
}

impl JobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // -----------------------------------------------------------------------
    // append_event
    // -----------------------------------------------------------------------

    /// Append an event, creating the job as `STARTED` if it does not exist.
    ///
    /// Returns `false` if the write failed (the failure is logged).
    pub async fn append_event(&self, job_id: &str, text: &str) -> bool {
        match self.try_append_event(job_id, text).await {
            Ok(true) => {
                tracing::info!(job_id, "Job started");
                true
            }
            Ok(false) => {
                tracing::debug!(job_id, event = text, "Appended job event");
                true
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to append job event");
                false
            }
        }
    }

    /// Returns whether this call created the job.
    async fn try_append_event(&self, job_id: &str, text: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let created = JobRepo::insert_if_absent(&mut *tx, job_id).await?;
        EventRepo::insert(&mut *tx, job_id, Utc::now(), text).await?;
        tx.commit().await?;
        Ok(created)
    }

    // -----------------------------------------------------------------------
    // update_job
    // -----------------------------------------------------------------------

    /// Move a job to `status`, overwrite its result and append one event per
    /// entry of `texts`.
    ///
    /// The job row is locked for the duration of the check and the write.
    /// Only `STARTED -> COMPLETE` and `STARTED -> ERROR` are accepted.
    pub async fn update_job(
        &self,
        job_id: &str,
        status: JobStatus,
        result: &str,
        texts: &[&str],
    ) -> UpdateOutcome {
        match self.try_update_job(job_id, status, result, texts).await {
            Ok(UpdateOutcome::Updated) => {
                tracing::info!(job_id, status = %status, "Job updated");
                UpdateOutcome::Updated
            }
            Ok(UpdateOutcome::NotFound) => {
                tracing::warn!(job_id, "Job not found, cannot update");
                UpdateOutcome::NotFound
            }
            Ok(UpdateOutcome::Rejected { current }) => {
                tracing::warn!(
                    job_id,
                    current = %current,
                    requested = %status,
                    "Rejected job status transition",
                );
                UpdateOutcome::Rejected { current }
            }
            Ok(UpdateOutcome::Failed) => UpdateOutcome::Failed,
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to update job");
                UpdateOutcome::Failed
            }
        }
    }

    async fn try_update_job(
        &self,
        job_id: &str,
        status: JobStatus,
        result: &str,
        texts: &[&str],
    ) -> Result<UpdateOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(current) = JobRepo::lock_status(&mut *tx, job_id).await? else {
            return Ok(UpdateOutcome::NotFound);
        };
        let current = parse_status(&current)?;
        if !current.can_transition_to(status) {
            return Ok(UpdateOutcome::Rejected { current });
        }

        JobRepo::set_status_and_result(&mut *tx, job_id, status, result).await?;
        for text in texts {
            EventRepo::insert(&mut *tx, job_id, Utc::now(), text).await?;
        }

        tx.commit().await?;
        Ok(UpdateOutcome::Updated)
    }

    // -----------------------------------------------------------------------
    // get_job
    // -----------------------------------------------------------------------

    /// Read a job with its full event log.
    ///
    /// Returns `None` both for unknown jobs and when the store is
    /// unreachable; use [`fetch_job`](Self::fetch_job) to tell them apart.
    pub async fn get_job(&self, job_id: &str) -> Option<JobSnapshot> {
        match self.fetch_job(job_id).await {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                tracing::warn!(job_id, "Job not found");
                None
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to retrieve job");
                None
            }
        }
    }

    /// Read a job with its full event log, surfacing store errors.
    ///
    /// The job row and its events are read in one repeatable-read
    /// transaction, so the snapshot is internally consistent.
    pub async fn fetch_job(&self, job_id: &str) -> Result<Option<JobSnapshot>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let Some(job) = JobRepo::find_by_id(&mut *tx, job_id).await? else {
            return Ok(None);
        };
        let events = EventRepo::list_for_job(&mut *tx, job_id).await?;
        tx.commit().await?;

        Ok(Some(JobSnapshot {
            status: parse_status(&job.status)?,
            job_id: job.job_id,
            result: job.result,
            events,
        }))
    }
}

fn parse_status(stored: &str) -> Result<JobStatus, sqlx::Error> {
    stored
        .parse::<JobStatus>()
        .map_err(|e: CoreError| sqlx::Error::Decode(Box::new(e)))
}
