//! Work queue row model.

use serde::Serialize;
use sqlx::FromRow;
use vlogcrew_core::types::{DbId, Timestamp};

/// A row from the `queue_items` table.
///
/// `payload` is the JSON form of [`JobInput`](vlogcrew_core::input::JobInput).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueueItem {
    pub id: DbId,
    pub job_id: String,
    pub payload: serde_json::Value,
    pub enqueued_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub claimed_by: Option<String>,
    pub finished_at: Option<Timestamp>,
}
