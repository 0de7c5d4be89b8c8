//! The seam between the pipeline and whatever executes an agent's task.

use async_trait::async_trait;
use vlogcrew_core::input::JobInput;

use crate::config::{AgentDef, TaskDef};
use crate::error::PipelineError;

/// Everything an agent needs to perform one task.
///
/// `agent` and `task` are already rendered for the job input. `context` is
/// the upstream output this task depends on, if any.
#[derive(Debug, Clone, Copy)]
pub struct TaskRequest<'a> {
    pub agent: &'a AgentDef,
    pub task: &'a TaskDef,
    pub input: &'a JobInput,
    pub context: Option<&'a str>,
    /// JSON shape the answer must follow, for steps that produce artifacts.
    pub output_format: Option<&'static str>,
}

/// Executes a single agent task and returns its raw text output.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, request: TaskRequest<'_>) -> Result<String, PipelineError>;
}
