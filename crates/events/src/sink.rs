//! Store-backed [`EventSink`] for a single job.

use async_trait::async_trait;
use vlogcrew_core::sink::EventSink;

use crate::store::JobStore;

/// Appends every emitted entry to one job's event log.
#[derive(Clone)]
pub struct JobEventSink {
    store: JobStore,
    job_id: String,
}

impl JobEventSink {
    pub fn new(store: JobStore, job_id: impl Into<String>) -> Self {
        Self {
            store,
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

#[async_trait]
impl EventSink for JobEventSink {
    async fn emit(&self, text: &str) {
        // Failures are already logged by the store.
        self.store.append_event(&self.job_id, text).await;
    }
}
