//! Repository for the `jobs` table.

use sqlx::{PgConnection, PgExecutor};
use vlogcrew_core::status::JobStatus;

use crate::models::job::Job;

/// Column list for `jobs` queries.
const COLUMNS: &str = "job_id, status, result, created_at, updated_at";

/// Provides read/write operations for job rows.
pub struct JobRepo;

impl JobRepo {
    /// Create a `STARTED` job with an empty result unless one already exists.
    ///
    /// Returns `true` if this call created the row. Concurrent callers are
    /// resolved by the primary key, so exactly one of them sees `true`.
    pub async fn insert_if_absent<'e, E: PgExecutor<'e>>(
        executor: E,
        job_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO jobs (job_id, status, result) VALUES ($1, $2, '') \
             ON CONFLICT (job_id) DO NOTHING",
        )
        .bind(job_id)
        .bind(JobStatus::Started.as_str())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a job by its identifier.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        job_id: &str,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE job_id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .fetch_optional(executor)
            .await
    }

    /// Read a job's stored status while taking a row lock.
    ///
    /// Must run inside a transaction; the lock is held until it ends.
    pub async fn lock_status(
        conn: &mut PgConnection,
        job_id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT status FROM jobs WHERE job_id = $1 FOR UPDATE")
            .bind(job_id)
            .fetch_optional(conn)
            .await
    }

    /// Overwrite status and result. Returns the number of rows touched.
    pub async fn set_status_and_result<'e, E: PgExecutor<'e>>(
        executor: E,
        job_id: &str,
        status: JobStatus,
        result: &str,
    ) -> Result<u64, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE jobs SET status = $2, result = $3, updated_at = NOW() WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(status.as_str())
        .bind(result)
        .execute(executor)
        .await?;
        Ok(done.rows_affected())
    }
}
