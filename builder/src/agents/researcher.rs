//! Market and UX research for the requested application.

use serde::Serialize;
use tracing::debug;

use crate::agents::{CompletionProfile, complete_text};
use crate::core::extract;
use crate::core::types::StageResult;
use crate::io::completion::Completion;
use crate::prompt;

const THINKING_FALLBACK: &str = "Analyzing market leaders and UX patterns.";
const FINDINGS_FALLBACK: &str = "Prioritizing mobile-first design and accessibility.";

pub struct Researcher {
    profile: CompletionProfile,
}

impl Default for Researcher {
    fn default() -> Self {
        Self {
            profile: CompletionProfile {
                temperature: 0.3,
                max_output_tokens: 1024,
            },
        }
    }
}

impl Researcher {
    /// Survey comparable products and design conventions for the idea.
    ///
    /// The full response text becomes the research summary handed to later
    /// stages; thinking and highlights are best-effort excerpts.
    pub fn run<C: Completion>(&self, completion: &C, idea: &str) -> StageResult {
        let text = match complete_text(completion, prompt::research(idea), self.profile) {
            Ok(text) => text,
            Err(failure) => return failure,
        };

        let thinking = extract::extract_section(&text, "thinking process", 5)
            .unwrap_or_else(|| THINKING_FALLBACK.to_string());
        let highlights = extract::extract_bullets(&text, 5)
            .into_iter()
            .map(|item| extract::truncate_chars(&item, 150))
            .collect::<Vec<_>>();
        debug!(insights = highlights.len(), "research stage finished");

        StageResult::Success {
            text,
            thinking,
            highlights,
        }
    }
}

/// Presentation payload for the research phase.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub success: bool,
    pub summary: String,
    pub thinking: String,
    pub findings: String,
    pub insights: Vec<String>,
}

impl ResearchReport {
    pub fn from_result(result: &StageResult) -> Self {
        match result {
            StageResult::Success {
                text,
                thinking,
                highlights,
            } => {
                let findings = extract::extract_section(text, "key findings", 6)
                    .unwrap_or_else(|| FINDINGS_FALLBACK.to_string());
                Self {
                    success: true,
                    summary: text.clone(),
                    thinking: thinking.clone(),
                    findings,
                    insights: highlights.clone(),
                }
            }
            StageResult::Failure { kind, .. } => Self {
                success: false,
                summary: String::new(),
                thinking: match kind {
                    crate::core::types::FailureKind::EmptyResponse => "No results found.",
                    _ => "Research error.",
                }
                .to_string(),
                findings: String::new(),
                insights: Vec::new(),
            },
        }
    }
}
