//! Job row model and the assembled job snapshot.

use serde::Serialize;
use sqlx::FromRow;
use vlogcrew_core::status::JobStatus;
use vlogcrew_core::types::Timestamp;

use super::event::JobEvent;

/// A row from the `jobs` table.
///
/// `status` is kept as stored text; [`JobSnapshot`] carries the parsed form.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub job_id: String,
    pub status: String,
    pub result: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Point-in-time view of a job: status, result and its full event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub status: JobStatus,
    pub result: String,
    /// Ordered by `timestamp`, then insertion order.
    pub events: Vec<JobEvent>,
}
