//! Structured outputs of the content-creation stage.
//!
//! Each creation step must produce one of these artifacts. The agent's raw
//! text is searched for the first JSON object, deserialized, then checked
//! with `validator` before the next step may consume it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Artifact trait
// ---------------------------------------------------------------------------

/// A validated value object produced by one pipeline step.
pub trait Artifact: Serialize + DeserializeOwned + Validate + Sized {
    /// Short name used in logs and error messages.
    const KIND: &'static str;

    /// JSON shape the producing agent is asked to follow.
    const FORMAT: &'static str;

    /// Parse and validate an artifact from an agent's raw output.
    fn parse(raw: &str) -> Result<Self, CoreError> {
        let json = extract_json_object(raw).ok_or_else(|| {
            CoreError::Validation(format!("{}: no JSON object in output", Self::KIND))
        })?;

        let artifact: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("{}: {e}", Self::KIND)))?;

        artifact
            .validate()
            .map_err(|e| CoreError::Validation(format!("{}: {e}", Self::KIND)))?;

        Ok(artifact)
    }
}

/// Locate the first balanced `{ ... }` object in `raw`.
///
/// Agents frequently wrap JSON in prose or Markdown fences; braces inside
/// string literals are ignored when matching.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Concept
// ---------------------------------------------------------------------------

/// Step 1: the vlog concept proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VlogConceptProposal {
    /// Attention-grabbing title with an emotional hook.
    #[validate(length(min = 1))]
    pub title: String,
    /// One-sentence core message.
    #[validate(length(min = 1))]
    pub core_message: String,
    #[validate(length(min = 1))]
    pub audience_resonance: String,
    /// Expected engagement (comments, saves, shares).
    #[validate(length(min = 1))]
    pub expected_engagement: String,
}

impl Artifact for VlogConceptProposal {
    const KIND: &'static str = "concept";
    const FORMAT: &'static str = r#"{"title": string, "core_message": string, "audience_resonance": string, "expected_engagement": string}"#;
}

// ---------------------------------------------------------------------------
// Storyboard
// ---------------------------------------------------------------------------

/// One time-boxed segment of the storyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TimeSegment {
    /// e.g. `"0-3s"` or `"15-45s"`.
    #[validate(length(min = 1))]
    pub time_range: String,
    #[validate(length(min = 1))]
    pub emotion_goal: String,
    #[validate(length(min = 1))]
    pub key_info: String,
    #[validate(length(min = 1))]
    pub visual_hint: String,
    #[validate(length(min = 1))]
    pub transition_logic: String,
}

/// Step 2: ordered storyboard outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StoryboardOutline {
    #[validate(length(min = 1), nested)]
    pub segments: Vec<TimeSegment>,
}

impl Artifact for StoryboardOutline {
    const KIND: &'static str = "storyboard";
    const FORMAT: &'static str = r#"{"segments": [{"time_range": string, "emotion_goal": string, "key_info": string, "visual_hint": string, "transition_logic": string}]}"#;
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Step 3: the spoken script plus voice and music direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VlogScript {
    /// Opening line, under five seconds.
    #[validate(length(min = 1))]
    pub hook_line: String,
    /// Body lines with tone and pause cues such as `[upbeat]`.
    #[validate(length(min = 1))]
    pub main_script: String,
    #[validate(length(min = 1))]
    pub call_to_action: String,
    pub subtitle_highlights: Vec<String>,
    #[validate(length(min = 1))]
    pub ai_voice_suggestion: String,
    #[validate(length(min = 1))]
    pub bgm_style_recommendation: String,
}

impl Artifact for VlogScript {
    const KIND: &'static str = "script";
    const FORMAT: &'static str = r#"{"hook_line": string, "main_script": string, "call_to_action": string, "subtitle_highlights": [string], "ai_voice_suggestion": string, "bgm_style_recommendation": string}"#;
}

// ---------------------------------------------------------------------------
// Publishing plan
// ---------------------------------------------------------------------------

/// Step 4: publishing optimisation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PublishingOptimizationPlan {
    #[validate(length(min = 1))]
    pub recommended_post_time: String,
    /// Exactly two alternative cover texts.
    #[validate(length(equal = 2))]
    pub cover_texts: Vec<String>,
    /// Exactly seven hashtags: five targeted, two broad-reach.
    #[validate(length(equal = 7))]
    pub hashtags: Vec<String>,
    #[validate(length(min = 1))]
    pub first_comment_draft: String,
    #[validate(length(min = 1))]
    pub engagement_maintenance_tips: String,
    #[validate(length(min = 1))]
    pub platform_specific_bgm_advice: String,
}

impl Artifact for PublishingOptimizationPlan {
    const KIND: &'static str = "publishing_plan";
    const FORMAT: &'static str = r#"{"recommended_post_time": string, "cover_texts": [string, string], "hashtags": [7 strings], "first_comment_draft": string, "engagement_maintenance_tips": string, "platform_specific_bgm_advice": string}"#;
}

// ---------------------------------------------------------------------------
// Content plan
// ---------------------------------------------------------------------------

/// The four creation-stage artifacts, in production order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPlan {
    pub concept: VlogConceptProposal,
    pub storyboard: StoryboardOutline,
    pub script: VlogScript,
    pub publishing_plan: PublishingOptimizationPlan,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
