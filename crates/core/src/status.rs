//! Job lifecycle status.
//!
//! Statuses are persisted as upper-case text in `jobs.status`. A job is
//! created `STARTED` and may move exactly once, to either `COMPLETE` or
//! `ERROR`. Terminal statuses are final.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Started,
    Complete,
    Error,
}

impl JobStatus {
    /// Text form stored in the database and returned by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Started => "STARTED",
            JobStatus::Complete => "COMPLETE",
            JobStatus::Error => "ERROR",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }

    /// Whether a job currently in `self` may be moved to `next`.
    ///
    /// Only `STARTED -> COMPLETE` and `STARTED -> ERROR` are legal.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        self == JobStatus::Started && next.is_terminal()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTED" => Ok(JobStatus::Started),
            "COMPLETE" => Ok(JobStatus::Complete),
            "ERROR" => Ok(JobStatus::Error),
            other => Err(CoreError::Validation(format!(
                "unknown job status '{other}'"
            ))),
        }
    }
}
