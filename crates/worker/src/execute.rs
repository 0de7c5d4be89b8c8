//! Running one job to a terminal status.

use vlogcrew_core::input::JobInput;
use vlogcrew_core::status::JobStatus;
use vlogcrew_events::{JobEventSink, JobStore, UpdateOutcome};
use vlogcrew_pipeline::Pipeline;

pub const STARTED_EVENT: &str = "Flow started";
pub const COMPLETE_EVENT: &str = "Flow complete";
pub const FAILED_EVENT: &str = "Flow failed";

/// Run the pipeline for `job_id` and write exactly one terminal status.
///
/// The pipeline runs in its own task, so a panic inside a stage is
/// recorded as `ERROR` like any other failure instead of leaving the job
/// in `STARTED`.
pub async fn run_job(
    store: &JobStore,
    pipeline: &Pipeline,
    job_id: &str,
    input: JobInput,
) -> UpdateOutcome {
    store.append_event(job_id, STARTED_EVENT).await;

    let sink = JobEventSink::new(store.clone(), job_id);
    let task_pipeline = pipeline.clone();
    let handle = tokio::spawn(async move { task_pipeline.run(&input, &sink).await });

    let (status, result, event) = match handle.await {
        Ok(Ok(output)) => match serde_json::to_string(&output) {
            Ok(json) => (JobStatus::Complete, json, COMPLETE_EVENT),
            Err(e) => (
                JobStatus::Error,
                format!("Failed to encode result: {e}"),
                FAILED_EVENT,
            ),
        },
        Ok(Err(e)) => (JobStatus::Error, e.to_string(), FAILED_EVENT),
        Err(e) => (
            JobStatus::Error,
            format!("Pipeline task aborted: {e}"),
            FAILED_EVENT,
        ),
    };

    if status == JobStatus::Error {
        tracing::warn!(job_id, error = %result, "Job failed");
    } else {
        tracing::info!(job_id, "Job complete");
    }

    store.update_job(job_id, status, &result, &[event]).await
}
