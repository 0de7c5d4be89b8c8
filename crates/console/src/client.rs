//! Thin HTTP client for the job API.

use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use vlogcrew_core::status::JobStatus;
use vlogcrew_core::types::Timestamp;

#[derive(Debug, Deserialize)]
pub struct CreatedJob {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct JobView {
    pub job_id: String,
    pub status: JobStatus,
    pub result: serde_json::Value,
    pub events: Vec<EventView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventView {
    pub timestamp: Timestamp,
    pub data: String,
}

impl JobView {
    /// Events after the first `seen`.
    pub fn events_since(&self, seen: usize) -> &[EventView] {
        self.events.get(seen..).unwrap_or(&[])
    }
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_url` is the job resource, e.g. `http://localhost:8012/api/crewai`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn submit(
        &self,
        platform: &str,
        niche: &str,
        image: Option<&Path>,
    ) -> anyhow::Result<CreatedJob> {
        let mut form = reqwest::multipart::Form::new()
            .text("target_platform", platform.to_string())
            .text("creator_niche", niche.to_string());

        if let Some(path) = image {
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".into());
            let part = reqwest::multipart::Part::bytes(data)
                .file_name(file_name)
                .mime_str(image_mime(path))?;
            form = form.part("file", part);
        }

        let resp = self.http.post(&self.base_url).multipart(form).send().await?;
        decode(resp).await
    }

    pub async fn status(&self, job_id: &str) -> anyhow::Result<JobView> {
        let url = format!("{}/{}", self.base_url, job_id.trim());
        let resp = self.http.get(url).send().await?;
        decode(resp).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> anyhow::Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        let detail = body["detail"].as_str().unwrap_or("no detail");
        bail!("HTTP {status}: {detail}");
    }
    Ok(resp.json().await?)
}

/// MIME type for an image path, by extension.
pub fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
