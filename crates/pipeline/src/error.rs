use vlogcrew_core::error::CoreError;

/// Errors raised while configuring or running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Crew YAML is missing, malformed, or references unknown agents/tasks.
    #[error("Invalid crew configuration: {0}")]
    Config(String),

    /// The model call failed (network, non-2xx status, unexpected body).
    #[error("Agent call failed: {0}")]
    Agent(String),

    /// An agent's output did not parse or validate as the expected artifact.
    #[error(transparent)]
    Artifact(#[from] CoreError),

    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A stage failed; `source` is the underlying cause.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<PipelineError>,
    },
}
