//! Implementation planning for the requested application.

use serde::Serialize;

use crate::agents::{CompletionProfile, complete_text};
use crate::core::extract;
use crate::core::types::StageResult;
use crate::io::completion::Completion;
use crate::prompt;

pub struct Architect {
    profile: CompletionProfile,
}

impl Default for Architect {
    fn default() -> Self {
        Self {
            profile: CompletionProfile {
                temperature: 0.4,
                max_output_tokens: 1024,
            },
        }
    }
}

impl Architect {
    /// Turn the idea plus an optional research excerpt into a build plan.
    pub fn run<C: Completion>(&self, completion: &C, idea: &str, research: &str) -> StageResult {
        let text = match complete_text(completion, prompt::plan(idea, research), self.profile) {
            Ok(text) => text,
            Err(failure) => return failure.with_fallback(fallback_plan(idea)),
        };

        let thinking = extract::extract_section(&text, "architect thoughts", 4)
            .unwrap_or_else(|| format!("Designing a modular structure for {idea}."));
        let highlights = extract::extract_bullets(&text, 6)
            .into_iter()
            .map(|item| extract::truncate_chars(&item, 50))
            .collect();

        StageResult::Success {
            text,
            thinking,
            highlights,
        }
    }
}

/// Minimal plan used when the planning call fails outright.
pub fn fallback_plan(idea: &str) -> String {
    format!("Basic plan for: {idea}")
}

/// Presentation payload for the planning phase.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub success: bool,
    pub thinking: String,
    pub plan: String,
    pub components: Vec<String>,
}

impl PlanReport {
    pub fn from_result(result: &StageResult, idea: &str) -> Self {
        match result {
            StageResult::Success {
                text,
                thinking,
                highlights,
            } => {
                let components = if highlights.is_empty() {
                    vec![
                        "UI Shell".to_string(),
                        "State Manager".to_string(),
                        "Feature Modules".to_string(),
                    ]
                } else {
                    highlights.clone()
                };
                Self {
                    success: true,
                    thinking: thinking.clone(),
                    plan: text.clone(),
                    components,
                }
            }
            StageResult::Failure { fallback_text, .. } => Self {
                success: false,
                thinking: "Planning error.".to_string(),
                plan: fallback_text
                    .clone()
                    .unwrap_or_else(|| fallback_plan(idea)),
                components: vec![
                    "HTML Structure".to_string(),
                    "CSS Styles".to_string(),
                    "JS Logic".to_string(),
                ],
            },
        }
    }
}
