//! Image description client.
//!
//! Uploaded reference images are sent to DashScope's multimodal generation
//! endpoint as a base64 data URL together with a fixed instruction; the
//! returned text is appended to the creator's description.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

const DEFAULT_MODEL: &str = "qwen-vl-plus";
const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";
const GENERATION_PATH: &str = "/services/aigc/multimodal-generation/generation";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Instruction sent alongside every image.
pub const DESCRIBE_PROMPT: &str = "Describe this image in detail, including the objects, \
    scene, any visible text, and its visual style.";

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("image description service is not configured (set QWEN_VL_API_KEY)")]
    NotConfigured,

    #[error("request failed: {0}")]
    Http(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("no answer within {} seconds", .0.as_secs_f32())]
    Timeout(Duration),
}

/// Turns image bytes into descriptive text.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, image: &[u8], mime_type: &str) -> Result<String, VisionError>;
}

/// Settings for [`DashScopeDescriber`].
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// `None` leaves the describer unconfigured; image uploads then fail.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl VisionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                                 |
    /// |--------------------|-----------------------------------------|
    /// | `QWEN_VL_API_KEY`  | unset                                   |
    /// | `QWEN_VL_MODEL`    | `qwen-vl-plus`                          |
    /// | `QWEN_VL_BASE_URL` | `https://dashscope.aliyuncs.com/api/v1` |
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("QWEN_VL_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("QWEN_VL_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            base_url: std::env::var("QWEN_VL_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// [`ImageDescriber`] backed by the DashScope multimodal API.
pub struct DashScopeDescriber {
    config: VisionConfig,
    http: reqwest::Client,
}

impl DashScopeDescriber {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VisionError::Http(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[async_trait]
impl ImageDescriber for DashScopeDescriber {
    async fn describe(&self, image: &[u8], mime_type: &str) -> Result<String, VisionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(VisionError::NotConfigured)?;

        let url = format!(
            "{}{GENERATION_PATH}",
            self.config.base_url.trim_end_matches('/')
        );
        let body = build_request(&self.config.model, image, mime_type);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| VisionError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(VisionError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let resp_body: Value = serde_json::from_str(&text)
            .map_err(|e| VisionError::InvalidResponse(e.to_string()))?;
        parse_description(&resp_body)
    }
}

/// Message from an error response: the JSON `message` field when present,
/// otherwise the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Encode `image` as a `data:` URL.
pub fn data_url(image: &[u8], mime_type: &str) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(image))
}

fn build_request(model: &str, image: &[u8], mime_type: &str) -> Value {
    json!({
        "model": model,
        "input": {
            "messages": [{
                "role": "user",
                "content": [
                    { "image": data_url(image, mime_type) },
                    { "text": DESCRIBE_PROMPT },
                ],
            }],
        },
    })
}

/// Pull the first text part out of a multimodal generation response.
pub fn parse_description(body: &Value) -> Result<String, VisionError> {
    let parts = body["output"]["choices"][0]["message"]["content"]
        .as_array()
        .ok_or_else(|| VisionError::InvalidResponse(body.to_string()))?;

    parts
        .iter()
        .find_map(|part| part["text"].as_str())
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| VisionError::InvalidResponse("no text in response".into()))
}

/// MIME type for an upload: the declared content type, else a guess from
/// the file extension, else JPEG.
pub fn mime_type_for(content_type: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(ct) = content_type.filter(|ct| ct.starts_with("image/")) {
        return ct.to_string();
    }
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
    .to_string()
}
