//! Crew definitions: agents and tasks as plain data.
//!
//! A crew YAML file has two sections:
//!
//! ```yaml
//! agents:
//!   vlog_trend_analyst:
//!     role: "Short-video trend analyst for {target_platform}"
//!     goal: "..."
//!     backstory: "..."
//!
//! tasks:
//!   - name: trend_research_task
//!     agent: vlog_trend_analyst
//!     description: "Research trends for {creator_niche}"
//!     expected_output: "..."
//! ```
//!
//! `{target_platform}` and `{creator_niche}` are replaced with the job
//! input when a task is rendered. The built-in crews are compiled into the
//! binary; a directory containing `insight_crew.yaml` and
//! `creation_crew.yaml` may replace them at startup.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vlogcrew_core::input::JobInput;

use crate::error::PipelineError;

pub const INSIGHT_CREW_FILE: &str = "insight_crew.yaml";
pub const CREATION_CREW_FILE: &str = "creation_crew.yaml";

const BUILTIN_INSIGHT_CREW: &str = include_str!("../config/insight_crew.yaml");
const BUILTIN_CREATION_CREW: &str = include_str!("../config/creation_crew.yaml");

/// Task names the stages look up. Crew files must define all of them.
pub mod tasks {
    pub const TREND_RESEARCH: &str = "trend_research_task";
    pub const VLOG_CONCEPT: &str = "vlog_concept_task";
    pub const STORY_STRUCTURE: &str = "story_structure_task";
    pub const SCRIPTWRITING: &str = "scriptwriting_task";
    pub const PUBLISHING_OPTIMIZATION: &str = "publishing_optimization_task";
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Persona an agent plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDef {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentDef {
    /// Copy with placeholders filled from `input`.
    pub fn render(&self, input: &JobInput) -> AgentDef {
        AgentDef {
            role: interpolate(&self.role, input),
            goal: interpolate(&self.goal, input),
            backstory: interpolate(&self.backstory, input),
        }
    }
}

/// One unit of work assigned to a named agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    pub name: String,
    /// Key into [`CrewDefinition::agents`].
    pub agent: String,
    pub description: String,
    pub expected_output: String,
}

impl TaskDef {
    /// Copy with placeholders filled from `input`.
    pub fn render(&self, input: &JobInput) -> TaskDef {
        TaskDef {
            name: self.name.clone(),
            agent: self.agent.clone(),
            description: interpolate(&self.description, input),
            expected_output: interpolate(&self.expected_output, input),
        }
    }
}

/// A set of agents and the ordered tasks they perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewDefinition {
    pub agents: BTreeMap<String, AgentDef>,
    pub tasks: Vec<TaskDef>,
}

impl CrewDefinition {
    /// Parse and check a crew definition.
    ///
    /// Every task must reference a defined agent and task names must be
    /// unique.
    pub fn from_yaml(source: &str) -> Result<Self, PipelineError> {
        let crew: CrewDefinition =
            serde_yaml::from_str(source).map_err(|e| PipelineError::Config(e.to_string()))?;
        crew.check()?;
        Ok(crew)
    }

    fn check(&self) -> Result<(), PipelineError> {
        if self.tasks.is_empty() {
            return Err(PipelineError::Config("crew defines no tasks".into()));
        }
        for (i, task) in self.tasks.iter().enumerate() {
            if !self.agents.contains_key(&task.agent) {
                return Err(PipelineError::Config(format!(
                    "task '{}' references unknown agent '{}'",
                    task.name, task.agent
                )));
            }
            if self.tasks[..i].iter().any(|t| t.name == task.name) {
                return Err(PipelineError::Config(format!(
                    "duplicate task '{}'",
                    task.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a task and the agent assigned to it.
    pub fn require_task(&self, name: &str) -> Result<(&TaskDef, &AgentDef), PipelineError> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| PipelineError::Config(format!("missing task '{name}'")))?;
        // `check` guarantees the agent exists for parsed crews; hand-built
        // values may still be inconsistent.
        let agent = self.agents.get(&task.agent).ok_or_else(|| {
            PipelineError::Config(format!(
                "task '{name}' references unknown agent '{}'",
                task.agent
            ))
        })?;
        Ok((task, agent))
    }

    fn require_all(&self, names: &[&str]) -> Result<(), PipelineError> {
        names.iter().try_for_each(|name| self.require_task(name).map(|_| ()))
    }
}

// ---------------------------------------------------------------------------
// Crew set
// ---------------------------------------------------------------------------

/// The two crews the pipeline runs, one per stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewConfig {
    pub insight: CrewDefinition,
    pub creation: CrewDefinition,
}

impl CrewConfig {
    /// The crews compiled into the binary.
    pub fn builtin() -> Result<Self, PipelineError> {
        Self::from_sources(BUILTIN_INSIGHT_CREW, BUILTIN_CREATION_CREW)
    }

    /// Load crews from `dir` if given, otherwise use the built-in ones.
    pub fn load(dir: Option<&Path>) -> Result<Self, PipelineError> {
        let Some(dir) = dir else {
            return Self::builtin();
        };
        let insight = read_crew_file(&dir.join(INSIGHT_CREW_FILE))?;
        let creation = read_crew_file(&dir.join(CREATION_CREW_FILE))?;
        tracing::info!(dir = %dir.display(), "Loaded crew definitions");
        Self::from_sources(&insight, &creation)
    }

    fn from_sources(insight: &str, creation: &str) -> Result<Self, PipelineError> {
        let insight = CrewDefinition::from_yaml(insight)?;
        insight.require_all(&[tasks::TREND_RESEARCH])?;

        let creation = CrewDefinition::from_yaml(creation)?;
        creation.require_all(&[
            tasks::VLOG_CONCEPT,
            tasks::STORY_STRUCTURE,
            tasks::SCRIPTWRITING,
            tasks::PUBLISHING_OPTIMIZATION,
        ])?;

        Ok(Self { insight, creation })
    }
}

fn read_crew_file(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path)
        .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
}

/// Replace `{target_platform}` and `{creator_niche}` in `template`.
///
/// Single pass over the template: substituted values are never scanned
/// again, so input text containing a placeholder is kept verbatim.
pub fn interpolate(template: &str, input: &JobInput) -> String {
    let placeholders = [
        ("{target_platform}", input.target_platform.as_str()),
        ("{creator_niche}", input.creator_niche.as_str()),
    ];

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match placeholders
            .iter()
            .find(|(name, _)| rest.starts_with(name))
        {
            Some((name, value)) => {
                out.push_str(value);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
