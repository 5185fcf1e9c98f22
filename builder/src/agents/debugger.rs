//! Targeted repair and user-directed refinement of an existing document.
//!
//! Both operations share a shape: send the current document plus change
//! instructions, clean the response, and on any failure hand back the
//! untouched input so the workflow never loses the last good version.

use serde::Serialize;
use tracing::warn;

use crate::agents::{CompletionProfile, complete_text};
use crate::core::extract;
use crate::core::types::{FailureKind, StageResult};
use crate::io::completion::Completion;
use crate::prompt;

pub struct Debugger {
    profile: CompletionProfile,
}

impl Default for Debugger {
    fn default() -> Self {
        Self {
            profile: CompletionProfile {
                temperature: 0.3,
                max_output_tokens: 16_384,
            },
        }
    }
}

impl Debugger {
    /// Apply reviewer-identified fixes to the document.
    pub fn fix<C: Completion>(&self, completion: &C, markup: &str, issues: &str) -> StageResult {
        let prompt = prompt::repair(markup, issues);
        let thinking = "Resolving identified issues in layout and functionality.".to_string();
        let highlights = vec!["Applied stability fixes".to_string()];
        self.rewrite(completion, markup, prompt, thinking, highlights)
    }

    /// Apply a user-requested change to the document.
    pub fn refine<C: Completion>(
        &self,
        completion: &C,
        markup: &str,
        feedback: &str,
    ) -> StageResult {
        let prompt = prompt::refine(markup, feedback);
        let thinking = format!(
            "Implementing your request: '{}'.",
            extract::truncate_chars(feedback.trim(), 50)
        );
        let highlights = vec![extract::truncate_chars(feedback.trim(), 100)];
        self.rewrite(completion, markup, prompt, thinking, highlights)
    }

    fn rewrite<C: Completion>(
        &self,
        completion: &C,
        original: &str,
        prompt: String,
        thinking: String,
        highlights: Vec<String>,
    ) -> StageResult {
        let text = match complete_text(completion, prompt, self.profile) {
            Ok(text) => text,
            Err(failure) => return failure.with_fallback(original.to_string()),
        };

        let markup = extract::clean_markup(&text);
        if markup.trim().is_empty() {
            warn!("rewrite response contained no document, keeping previous version");
            return StageResult::Failure {
                kind: FailureKind::MalformedResponse,
                message: "rewrite produced no usable document".to_string(),
                fallback_text: Some(original.to_string()),
            };
        }

        StageResult::Success {
            text: markup,
            thinking,
            highlights,
        }
    }
}

/// Presentation payload for the fix and refine phases.
#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub success: bool,
    pub thinking: String,
    pub markup: String,
    pub changes: Vec<String>,
}

impl PatchReport {
    /// `previous` backs the report when the rewrite failed without a
    /// fallback of its own.
    pub fn from_result(result: &StageResult, previous: &str) -> Self {
        match result {
            StageResult::Success {
                text,
                thinking,
                highlights,
            } => Self {
                success: true,
                thinking: thinking.clone(),
                markup: text.clone(),
                changes: highlights.clone(),
            },
            StageResult::Failure { fallback_text, .. } => Self {
                success: false,
                thinking: "Patch error, previous version kept.".to_string(),
                markup: fallback_text
                    .clone()
                    .unwrap_or_else(|| previous.to_string()),
                changes: Vec::new(),
            },
        }
    }
}
