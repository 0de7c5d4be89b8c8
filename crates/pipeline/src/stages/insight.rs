//! Stage one: trend research.

use crate::config::{tasks, CrewDefinition};
use crate::error::PipelineError;

use super::{guarded, StageContext};

pub const STAGE: &str = "insight";

/// Run the trend research task and return its text.
pub async fn run_insight(
    ctx: StageContext<'_>,
    crew: &CrewDefinition,
) -> Result<String, PipelineError> {
    ctx.sink.emit("Insight stage started").await;

    let insight = guarded(ctx.sink, STAGE, async {
        ctx.run_task(crew, tasks::TREND_RESEARCH, None, None).await
    })
    .await?;

    ctx.sink.emit("Insight stage complete").await;
    Ok(insight)
}
