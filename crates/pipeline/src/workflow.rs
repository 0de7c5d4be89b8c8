//! Explicit wiring of the two stages.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vlogcrew_core::artifacts::ContentPlan;
use vlogcrew_core::input::JobInput;
use vlogcrew_core::sink::EventSink;

use crate::config::CrewConfig;
use crate::error::PipelineError;
use crate::runner::AgentRunner;
use crate::stages::{run_creation, run_insight, StageContext};

/// Final result of a successful run.
///
/// Serializes flat: `{ "insight", "concept", "storyboard", "script",
/// "publishing_plan" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub insight: String,
    #[serde(flatten)]
    pub plan: ContentPlan,
}

/// The insight stage followed by the creation stage.
///
/// Cheap to clone; crews are shared behind an `Arc`.
#[derive(Clone)]
pub struct Pipeline {
    crews: Arc<CrewConfig>,
    runner: Arc<dyn AgentRunner>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Run both stages for `input`, reporting progress to `sink`.
    ///
    /// Stops at the first failed stage; events emitted before the failure
    /// stay in the sink.
    pub async fn run(
        &self,
        input: &JobInput,
        sink: &dyn EventSink,
    ) -> Result<PipelineOutput, PipelineError> {
        let ctx = StageContext {
            runner: self.runner.as_ref(),
            sink,
            input,
        };

        let insight = run_insight(ctx, &self.crews.insight).await?;
        let plan = run_creation(ctx, &self.crews.creation, &insight).await?;

        Ok(PipelineOutput { insight, plan })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("insight_tasks", &self.crews.insight.tasks.len())
            .field("creation_tasks", &self.crews.creation.tasks.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Pipeline`]. A runner is required; crews default to the
/// built-in definitions.
#[derive(Default)]
pub struct PipelineBuilder {
    crews: Option<CrewConfig>,
    runner: Option<Arc<dyn AgentRunner>>,
}

impl PipelineBuilder {
    pub fn crews(mut self, crews: CrewConfig) -> Self {
        self.crews = Some(crews);
        self
    }

    pub fn runner(mut self, runner: Arc<dyn AgentRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let runner = self
            .runner
            .ok_or_else(|| PipelineError::Config("pipeline requires an agent runner".into()))?;
        let crews = match self.crews {
            Some(crews) => crews,
            None => CrewConfig::builtin()?,
        };
        Ok(Pipeline {
            crews: Arc::new(crews),
            runner,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vlogcrew_core::sink::RecordingSink;

    use super::*;
    use crate::config::tasks;
    use crate::stages::testing::ScriptedRunner;

    fn pipeline(runner: ScriptedRunner) -> (Pipeline, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        let pipeline = Pipeline::builder().runner(runner.clone()).build().unwrap();
        (pipeline, runner)
    }

    #[test]
    fn builder_requires_runner() {
        assert_matches!(Pipeline::builder().build(), Err(PipelineError::Config(_)));
    }

    #[test]
    fn debug_summarizes_crews() {
        let (pipeline, _) = pipeline(ScriptedRunner::happy());
        let debug = format!("{pipeline:?}");
        assert!(debug.contains("insight_tasks: 1"));
        assert!(debug.contains("creation_tasks: 4"));
    }

    #[tokio::test]
    async fn full_run_produces_flat_output() {
        let (pipeline, _) = pipeline(ScriptedRunner::happy());
        let sink = RecordingSink::new();
        let input = JobInput::new("douyin", "cooking").unwrap();

        let output = pipeline.run(&input, &sink).await.unwrap();

        let json = serde_json::to_value(&output).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["concept", "insight", "publishing_plan", "script", "storyboard"]
        );
        assert_eq!(json["insight"], "Trend report: quick meals are hot");

        let entries = sink.entries();
        assert_eq!(entries[0], "Insight stage started");
        assert_eq!(entries[2], "Insight stage complete");
        assert_eq!(entries[3], "Creation stage started");
        assert_eq!(entries.last().unwrap(), "Creation stage complete");
    }

    #[tokio::test]
    async fn failed_insight_skips_creation() {
        let (pipeline, runner) =
            pipeline(ScriptedRunner::happy().fail(tasks::TREND_RESEARCH, "search down"));
        let sink = RecordingSink::new();
        let input = JobInput::new("douyin", "cooking").unwrap();

        let err = pipeline.run(&input, &sink).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "insight stage failed: Agent call failed: search down"
        );
        assert_eq!(runner.calls().len(), 1);
        assert!(!sink
            .entries()
            .iter()
            .any(|e| e == "Creation stage started"));
    }

    #[tokio::test]
    async fn placeholders_reach_the_runner() {
        struct Capture(std::sync::Mutex<Vec<String>>);

        #[async_trait::async_trait]
        impl AgentRunner for Capture {
            async fn run(
                &self,
                request: crate::runner::TaskRequest<'_>,
            ) -> Result<String, PipelineError> {
                self.0
                    .lock()
                    .unwrap()
                    .push(request.task.description.clone());
                Err(PipelineError::Agent("stop".into()))
            }
        }

        let capture = Arc::new(Capture(Default::default()));
        let pipeline = Pipeline::builder().runner(capture.clone()).build().unwrap();
        let input = JobInput::new("bilibili", "vegan baking").unwrap();

        let _ = pipeline.run(&input, &RecordingSink::new()).await;

        let descriptions = capture.0.lock().unwrap();
        assert!(descriptions[0].contains("bilibili"));
        assert!(descriptions[0].contains("vegan baking"));
        assert!(!descriptions[0].contains("{creator_niche}"));
    }
}
