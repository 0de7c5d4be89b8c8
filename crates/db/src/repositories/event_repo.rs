//! Repository for the `events` table.

use sqlx::PgExecutor;
use vlogcrew_core::types::{DbId, Timestamp};

use crate::models::event::JobEvent;

/// Column list for `events` queries.
const COLUMNS: &str = "id, job_id, timestamp, data";

/// Provides append and read operations for job events.
pub struct EventRepo;

impl EventRepo {
    /// Append an event to a job's log, returning the generated ID.
    ///
    /// The job row must already exist (foreign key).
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        job_id: &str,
        timestamp: Timestamp,
        data: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events (job_id, timestamp, data) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(job_id)
        .bind(timestamp)
        .bind(data)
        .fetch_one(executor)
        .await
    }

    /// List a job's events oldest-first. Insertion order breaks timestamp ties.
    pub async fn list_for_job<'e, E: PgExecutor<'e>>(
        executor: E,
        job_id: &str,
    ) -> Result<Vec<JobEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE job_id = $1 ORDER BY timestamp ASC, id ASC"
        );
        sqlx::query_as::<_, JobEvent>(&query)
            .bind(job_id)
            .fetch_all(executor)
            .await
    }
}
