//! Handlers for creating jobs and polling their status.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use vlogcrew_core::error::CoreError;
use vlogcrew_core::input::JobInput;
use vlogcrew_core::status::JobStatus;
use vlogcrew_core::types::Timestamp;
use vlogcrew_db::models::job::JobSnapshot;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::vision::{mime_type_for, VisionError};

/// Response body for a newly created job.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: String,
}

/// Response body for a status poll.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    /// The stored result decoded as JSON, or the raw text if it is not JSON.
    pub result: serde_json::Value,
    pub events: Vec<EventResponse>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub timestamp: Timestamp,
    pub data: String,
}

impl From<JobSnapshot> for JobStatusResponse {
    fn from(job: JobSnapshot) -> Self {
        Self {
            result: decode_result(job.result),
            job_id: job.job_id,
            status: job.status,
            events: job
                .events
                .into_iter()
                .map(|e| EventResponse {
                    timestamp: e.timestamp,
                    data: e.data,
                })
                .collect(),
        }
    }
}

fn decode_result(raw: String) -> serde_json::Value {
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

/// An uploaded reference image.
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// POST /api/crewai
///
/// Multipart form with required `target_platform` and `creator_niche`
/// text fields and an optional `file` image. When an image is attached its
/// description is appended to `creator_niche` before the job is queued.
pub async fn create_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<CreateJobResponse>> {
    let mut target_platform: Option<String> = None;
    let mut creator_niche: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "target_platform" => {
                let text = field.text().await?;
                target_platform = Some(text);
            }
            "creator_niche" => {
                let text = field.text().await?;
                creator_niche = Some(text);
            }
            "file" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                // Browsers send an empty, unnamed part when no file is chosen.
                if file_name.is_none() && data.is_empty() {
                    continue;
                }
                upload = Some(Upload {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {} // ignore unknown fields
        }
    }

    let mut input = JobInput::new(
        required(target_platform, "target_platform")?,
        required(creator_niche, "creator_niche")?,
    )?;

    if let Some(upload) = upload {
        if upload.data.is_empty() {
            return Err(AppError::BadRequest("Image content is empty".into()));
        }
        let mime_type = mime_type_for(upload.content_type.as_deref(), upload.file_name.as_deref());
        let limit = state.config.image_timeout();
        let description =
            tokio::time::timeout(limit, state.describer.describe(&upload.data, &mime_type))
                .await
                .map_err(|_| VisionError::Timeout(limit))??;
        tracing::debug!(chars = description.len(), "Image described");
        input = input.with_image_description(&description);
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    vlogcrew_worker::enqueue_job(&state.pool, &job_id, &input).await?;

    tracing::info!(job_id = %job_id, platform = %input.target_platform, "Job created");
    Ok(Json(CreateJobResponse { job_id }))
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing required '{field}' field")))
}

/// GET /api/crewai/{job_id}
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobStatusResponse>> {
    let Some(job) = state.store.fetch_job(&job_id).await? else {
        return Err(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }
        .into());
    };
    Ok(Json(job.into()))
}
