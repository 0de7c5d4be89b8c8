//! Repository for the `queue_items` table.
//!
//! The table is the broker between the gateway and the workers. Items are
//! claimed once and never re-delivered: there is no visibility timeout.

use sqlx::{PgExecutor, PgPool};
use vlogcrew_core::types::DbId;

use crate::models::queue::QueueItem;

/// Column list for `queue_items` queries.
const COLUMNS: &str = "id, job_id, payload, enqueued_at, claimed_at, claimed_by, finished_at";

/// Provides enqueue/claim operations for the work queue.
pub struct QueueRepo;

impl QueueRepo {
    /// Push a new unclaimed item.
    pub async fn enqueue<'e, E: PgExecutor<'e>>(
        executor: E,
        job_id: &str,
        payload: &serde_json::Value,
    ) -> Result<QueueItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO queue_items (job_id, payload) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueItem>(&query)
            .bind(job_id)
            .bind(payload)
            .fetch_one(executor)
            .await
    }

    /// Atomically claim the oldest unclaimed item for a worker.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent workers, in this
    /// process or another, never claim the same item.
    pub async fn claim_next(
        pool: &PgPool,
        worker_name: &str,
    ) -> Result<Option<QueueItem>, sqlx::Error> {
        let query = format!(
            "UPDATE queue_items \
             SET claimed_at = NOW(), claimed_by = $1 \
             WHERE id = ( \
                 SELECT id FROM queue_items \
                 WHERE claimed_at IS NULL \
                 ORDER BY enqueued_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueItem>(&query)
            .bind(worker_name)
            .fetch_optional(pool)
            .await
    }

    /// Record that the item's job reached a terminal status.
    pub async fn mark_finished(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE queue_items SET finished_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of items still waiting for a worker.
    pub async fn count_unclaimed(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM queue_items WHERE claimed_at IS NULL")
            .fetch_one(pool)
            .await
    }

    /// Find an item by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QueueItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM queue_items WHERE id = $1");
        sqlx::query_as::<_, QueueItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
