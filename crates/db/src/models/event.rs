//! Job event row model.

use serde::Serialize;
use sqlx::FromRow;
use vlogcrew_core::types::{DbId, Timestamp};

/// A row from the `events` table. Append-only.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct JobEvent {
    pub id: DbId,
    pub job_id: String,
    pub timestamp: Timestamp,
    pub data: String,
}
