//! Generation stages, one agent module per stage kind.
//!
//! Every agent is a pure function of its inputs plus one outbound
//! completion call; all state lives with the caller. Transport and
//! empty-response errors never escape an agent as errors: they come back
//! as [`StageResult::Failure`] values for the orchestrator to act on.

pub mod architect;
pub mod coder;
pub mod debugger;
pub mod researcher;
pub mod tester;

use tracing::warn;

use crate::core::types::{FailureKind, StageResult};
use crate::io::completion::{Completion, CompletionRequest};
use crate::prompt;

/// Generation options for one stage kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionProfile {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Run one completion call and apply the uniform stage boundary:
/// transport errors and blank responses become failure values.
pub(crate) fn complete_text<C: Completion>(
    completion: &C,
    prompt: String,
    profile: CompletionProfile,
) -> Result<String, StageResult> {
    let request = CompletionRequest {
        prompt,
        temperature: profile.temperature,
        max_output_tokens: profile.max_output_tokens,
    };
    match completion.complete(&request) {
        Err(err) => {
            warn!(err = %err, "generation service call failed");
            Err(StageResult::Failure {
                kind: FailureKind::Transport,
                message: format!("{err:#}"),
                fallback_text: None,
            })
        }
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err(StageResult::Failure {
                    kind: FailureKind::EmptyResponse,
                    message: "generation service returned no text".to_string(),
                    fallback_text: None,
                })
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}

impl StageResult {
    /// Attach replacement content to a failure; successes pass through.
    pub(crate) fn with_fallback(self, fallback: String) -> StageResult {
        match self {
            StageResult::Failure {
                kind,
                message,
                fallback_text: _,
            } => StageResult::Failure {
                kind,
                message,
                fallback_text: Some(fallback),
            },
            success => success,
        }
    }
}

/// Conversational acknowledgment before a build or refinement starts.
///
/// Purely cosmetic; degrades to fixed copy on any service problem so the
/// workflow never stalls on it.
pub fn acknowledge<C: Completion>(completion: &C, request_text: &str, note: &str) -> String {
    const CHAT_PROFILE: CompletionProfile = CompletionProfile {
        temperature: 0.4,
        max_output_tokens: 256,
    };
    match complete_text(completion, prompt::chat(request_text, note), CHAT_PROFILE) {
        Ok(text) => text,
        Err(StageResult::Failure {
            kind: FailureKind::EmptyResponse,
            ..
        }) => "Got it! I'm starting the build process for your request.".to_string(),
        Err(_) => "I've received your request and am starting the build process.".to_string(),
    }
}
