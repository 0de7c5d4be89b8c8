//! OpenAI-compatible chat completion runner.
//!
//! Both supported providers (DeepSeek and DashScope's compatible mode)
//! expose `POST {base_url}/chat/completions` with bearer authentication, so
//! one client covers them. Each task is a single completion: the agent's
//! persona becomes the system message and the task, its upstream context
//! and the required output format become the user message.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::PipelineError;
use crate::runner::{AgentRunner, TaskRequest};

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Chat model vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    DeepSeek,
    Qwen,
}

impl LlmProvider {
    pub fn parse(value: &str) -> Result<Self, PipelineError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "qwen" => Ok(Self::Qwen),
            other => Err(PipelineError::Config(format!(
                "unknown LLM_PROVIDER '{other}' (expected 'deepseek' or 'qwen')"
            ))),
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::DeepSeek => "https://api.deepseek.com/v1",
            Self::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::Qwen => "qwen-plus",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::Qwen => "QWEN_API_KEY",
        }
    }
}

/// Connection settings for [`ChatAgentRunner`].
///
/// | Env var            | Default                        |
/// |--------------------|--------------------------------|
/// | `LLM_PROVIDER`     | `deepseek`                     |
/// | `DEEPSEEK_API_KEY` | required when provider is deepseek |
/// | `QWEN_API_KEY`     | required when provider is qwen |
/// | `LLM_MODEL`        | provider default               |
/// | `LLM_BASE_URL`     | provider default               |
/// | `LLM_TEMPERATURE`  | `0.7`                          |
/// | `LLM_TIMEOUT_SECS` | `120`                          |
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Defaults for `provider` with the given key.
    pub fn for_provider(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, PipelineError> {
        let provider = LlmProvider::parse(
            &std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "deepseek".into()),
        )?;

        let api_key = std::env::var(provider.api_key_var())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Config(format!("{} must be set", provider.api_key_var()))
            })?;

        let mut config = Self::for_provider(provider, api_key);

        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(value) = std::env::var("LLM_TEMPERATURE") {
            config.temperature = value
                .parse()
                .map_err(|_| PipelineError::Config("LLM_TEMPERATURE must be a number".into()))?;
        }
        if let Ok(value) = std::env::var("LLM_TIMEOUT_SECS") {
            let secs: u64 = value.parse().map_err(|_| {
                PipelineError::Config("LLM_TIMEOUT_SECS must be a valid u64".into())
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// [`AgentRunner`] backed by an OpenAI-compatible chat completion endpoint.
pub struct ChatAgentRunner {
    config: LlmConfig,
    http: reqwest::Client,
}

impl ChatAgentRunner {
    pub fn new(config: LlmConfig) -> Result<Self, PipelineError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Config(format!("HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AgentRunner for ChatAgentRunner {
    async fn run(&self, request: TaskRequest<'_>) -> Result<String, PipelineError> {
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": build_messages(&request),
        });

        tracing::debug!(
            task = %request.task.name,
            model = %self.config.model,
            "Sending chat completion",
        );

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Agent(e.to_string()))?;

        let status = resp.status();
        let resp_body: Value = resp
            .json()
            .await
            .map_err(|e| PipelineError::Agent(e.to_string()))?;

        if !status.is_success() {
            return Err(PipelineError::Agent(format!(
                "chat API error {status}: {resp_body}"
            )));
        }

        parse_chat_response(&resp_body)
    }
}

/// Build the `messages` array for one task.
pub fn build_messages(request: &TaskRequest<'_>) -> Vec<Value> {
    let agent = request.agent;
    let task = request.task;

    let system = format!(
        "You are {}. {}\nYour personal goal is: {}",
        agent.role.trim(),
        agent.backstory.trim(),
        agent.goal.trim(),
    );

    let mut user = format!("Current task: {}\n", task.description.trim());
    if let Some(context) = request.context {
        user.push_str("\nThis is the context you're working with:\n");
        user.push_str(context.trim());
        user.push('\n');
    }
    user.push_str("\nThis is the expected criteria for your final answer: ");
    user.push_str(task.expected_output.trim());
    user.push('\n');
    if let Some(format) = request.output_format {
        user.push_str("\nRespond with a single JSON object of this shape and nothing else:\n");
        user.push_str(format);
        user.push('\n');
    }

    vec![
        json!({ "role": "system", "content": system }),
        json!({ "role": "user", "content": user }),
    ]
}

/// Extract the assistant's text from a chat completion body.
pub fn parse_chat_response(body: &Value) -> Result<String, PipelineError> {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| PipelineError::Agent(format!("unexpected chat response: {body}")))?;

    if content.trim().is_empty() {
        return Err(PipelineError::Agent("model returned an empty answer".into()));
    }
    Ok(content.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
