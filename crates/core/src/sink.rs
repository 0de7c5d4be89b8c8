//! Progress reporting seam between pipeline stages and the job event log.

use std::sync::Mutex;

use async_trait::async_trait;

/// Receives free-text progress entries for a single job.
///
/// Implementations must not fail the caller: a sink that cannot persist an
/// entry logs and drops it.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, text: &str);
}

/// In-memory sink that records every entry. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in order.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, text: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_in_emit_order() {
        let sink = RecordingSink::new();
        sink.emit("first").await;
        sink.emit("second").await;
        assert_eq!(sink.entries(), vec!["first", "second"]);
    }
}
