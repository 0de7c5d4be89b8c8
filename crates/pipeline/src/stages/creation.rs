//! Stage two: concept, storyboard, script, publishing plan.
//!
//! Each step sees only its immediate predecessor: the concept step gets the
//! insight text, later steps get the previous artifact serialized as JSON.

use vlogcrew_core::artifacts::{
    ContentPlan, PublishingOptimizationPlan, StoryboardOutline, VlogConceptProposal, VlogScript,
};

use crate::config::{tasks, CrewDefinition};
use crate::error::PipelineError;

use super::{guarded, StageContext};

pub const STAGE: &str = "creation";

/// Produce a validated [`ContentPlan`] from the insight text.
pub async fn run_creation(
    ctx: StageContext<'_>,
    crew: &CrewDefinition,
    insight: &str,
) -> Result<ContentPlan, PipelineError> {
    ctx.sink.emit("Creation stage started").await;

    let plan = guarded(ctx.sink, STAGE, async {
        let concept: VlogConceptProposal = ctx.step(crew, tasks::VLOG_CONCEPT, insight).await?;

        let storyboard: StoryboardOutline = ctx
            .step(crew, tasks::STORY_STRUCTURE, &serde_json::to_string(&concept)?)
            .await?;

        let script: VlogScript = ctx
            .step(crew, tasks::SCRIPTWRITING, &serde_json::to_string(&storyboard)?)
            .await?;

        let publishing_plan: PublishingOptimizationPlan = ctx
            .step(
                crew,
                tasks::PUBLISHING_OPTIMIZATION,
                &serde_json::to_string(&script)?,
            )
            .await?;

        Ok(ContentPlan {
            concept,
            storyboard,
            script,
            publishing_plan,
        })
    })
    .await?;

    ctx.sink.emit("Creation stage complete").await;
    Ok(plan)
}
