//! Two-stage content pipeline.
//!
//! Stage one (insight) researches trends for a platform and niche; stage
//! two (creation) turns that insight into a validated [`ContentPlan`]
//! through four dependent steps. Agents and tasks are plain data loaded
//! from YAML ([`config`]); the model call sits behind [`AgentRunner`] so
//! the pipeline never depends on a particular provider.
//!
//! [`ContentPlan`]: vlogcrew_core::artifacts::ContentPlan
//! [`AgentRunner`]: runner::AgentRunner

pub mod config;
pub mod error;
pub mod llm;
pub mod runner;
pub mod stages;
pub mod workflow;

pub use error::PipelineError;
pub use workflow::{Pipeline, PipelineBuilder, PipelineOutput};
