//! The two pipeline stages and the task plumbing they share.

mod creation;
mod insight;

use std::future::Future;

use vlogcrew_core::artifacts::Artifact;
use vlogcrew_core::input::JobInput;
use vlogcrew_core::sink::EventSink;

use crate::config::CrewDefinition;
use crate::error::PipelineError;
use crate::runner::{AgentRunner, TaskRequest};

pub use creation::run_creation;
pub use insight::run_insight;

/// Borrowed collaborators for one pipeline run.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub runner: &'a dyn AgentRunner,
    pub sink: &'a dyn EventSink,
    pub input: &'a JobInput,
}

impl<'a> StageContext<'a> {
    /// Run one task from `crew` and emit its raw output.
    async fn run_task(
        &self,
        crew: &CrewDefinition,
        name: &str,
        context: Option<&str>,
        output_format: Option<&'static str>,
    ) -> Result<String, PipelineError> {
        let (task, agent) = crew.require_task(name)?;
        let task = task.render(self.input);
        let agent = agent.render(self.input);

        tracing::info!(task = name, agent = %task.agent, "Running task");
        let raw = self
            .runner
            .run(TaskRequest {
                agent: &agent,
                task: &task,
                input: self.input,
                context,
                output_format,
            })
            .await?;

        self.sink.emit(&raw).await;
        Ok(raw)
    }

    /// Run one task and parse its output as artifact `A`.
    async fn step<A: Artifact>(
        &self,
        crew: &CrewDefinition,
        name: &str,
        context: &str,
    ) -> Result<A, PipelineError> {
        let raw = self
            .run_task(crew, name, Some(context), Some(A::FORMAT))
            .await?;
        let artifact = A::parse(&raw)?;
        tracing::debug!(task = name, kind = A::KIND, "Artifact validated");
        Ok(artifact)
    }
}

/// Await a stage's work; on failure emit the error as an event and tag it
/// with the stage name.
async fn guarded<T, F>(
    sink: &dyn EventSink,
    stage: &'static str,
    work: F,
) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    match work.await {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(stage, error = %e, "Stage failed");
            sink.emit(&format!("An error occurred: {e}")).await;
            Err(PipelineError::Stage {
                stage,
                source: Box::new(e),
            })
        }
    }
}
