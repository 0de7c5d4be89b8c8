//! The work item carried on the queue from the gateway to a worker.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Pipeline input for one job.
///
/// `creator_niche` is the final description: the user's text, possibly
/// augmented with an image description by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    pub target_platform: String,
    pub creator_niche: String,
}

impl JobInput {
    /// Build an input, trimming both fields and rejecting blank values.
    pub fn new(
        target_platform: impl Into<String>,
        creator_niche: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let target_platform = target_platform.into().trim().to_string();
        let creator_niche = creator_niche.into().trim().to_string();

        if target_platform.is_empty() {
            return Err(CoreError::Validation(
                "target_platform must not be empty".to_string(),
            ));
        }
        if creator_niche.is_empty() {
            return Err(CoreError::Validation(
                "creator_niche must not be empty".to_string(),
            ));
        }

        Ok(Self {
            target_platform,
            creator_niche,
        })
    }

    /// Fold an image description into the niche text.
    pub fn with_image_description(mut self, description: &str) -> Self {
        self.creator_niche = format!(
            "User description: {}\n\nImage analysis: {}",
            self.creator_niche,
            description.trim()
        );
        self
    }
}
