//! Single-file document generation.

use serde::Serialize;
use tracing::warn;

use crate::agents::{CompletionProfile, complete_text};
use crate::core::extract;
use crate::core::types::{FailureKind, StageResult};
use crate::io::completion::Completion;
use crate::prompt;

pub struct Coder {
    profile: CompletionProfile,
}

impl Default for Coder {
    fn default() -> Self {
        Self {
            profile: CompletionProfile {
                temperature: 0.4,
                max_output_tokens: 16_384,
            },
        }
    }
}

impl Coder {
    /// Generate the complete document from idea, plan and research excerpt.
    ///
    /// Raw output goes through markup cleanup before anything downstream
    /// sees it; a response that cleans down to nothing is a malformed
    /// failure, not an empty artifact.
    pub fn run<C: Completion>(
        &self,
        completion: &C,
        idea: &str,
        plan: &str,
        research: &str,
    ) -> StageResult {
        let prompt = prompt::generate(idea, plan, research);
        let text = match complete_text(completion, prompt, self.profile) {
            Ok(text) => text,
            Err(failure) => return failure.with_fallback(fallback_markup(idea)),
        };

        let markup = extract::clean_markup(&text);
        if markup.trim().is_empty() {
            warn!("generated output contained no document after cleanup");
            return StageResult::Failure {
                kind: FailureKind::MalformedResponse,
                message: "response contained no usable document".to_string(),
                fallback_text: Some(fallback_markup(idea)),
            };
        }

        let thinking = extract::first_comment(&markup).unwrap_or_else(|| {
            format!("Building a responsive {idea} layout with embedded styling and interactions.")
        });
        let highlights = extract::detect_features(&markup);

        StageResult::Success {
            text: markup,
            thinking,
            highlights,
        }
    }
}

/// Placeholder document shown when generation fails completely.
pub fn fallback_markup(idea: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{idea}</title></head>\n\
         <body><h1>{idea}</h1><p>Generation failed. Please try again.</p></body>\n</html>"
    )
}

/// Presentation payload for the code phase.
#[derive(Debug, Clone, Serialize)]
pub struct CodeReport {
    pub success: bool,
    pub thinking: String,
    pub language: String,
    pub markup: String,
    pub features: Vec<String>,
}

impl CodeReport {
    pub fn from_result(result: &StageResult, idea: &str) -> Self {
        match result {
            StageResult::Success {
                text,
                thinking,
                highlights,
            } => Self {
                success: true,
                thinking: thinking.clone(),
                language: "html".to_string(),
                markup: text.clone(),
                features: highlights.clone(),
            },
            StageResult::Failure { fallback_text, .. } => Self {
                success: false,
                thinking: "Generation error.".to_string(),
                language: "html".to_string(),
                markup: fallback_text
                    .clone()
                    .unwrap_or_else(|| fallback_markup(idea)),
                features: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingCompletion, ScriptedCompletion};

    const FENCED_DOCUMENT: &str = "Here you go:\n```html\n\
<!DOCTYPE html>\n<html>\n<!-- Single-page layout with a sticky header. -->\n\
<head><style>@media (max-width: 600px) {}</style></head>\n\
<body><script>localStorage.setItem('k','v')</script></body>\n</html>\n```";

    #[test]
    fn generated_markup_is_cleaned_and_annotated() {
        let completion = ScriptedCompletion::repeating(FENCED_DOCUMENT);
        let result = Coder::default().run(&completion, "a todo app", "plan", "");

        let StageResult::Success {
            text,
            thinking,
            highlights,
        } = &result
        else {
            panic!("expected success");
        };
        assert!(text.starts_with("<!DOCTYPE html>"));
        assert!(!text.contains("```"));
        assert_eq!(thinking, "Single-page layout with a sticky header.");
        assert!(highlights.contains(&"Responsive layout".to_string()));
        assert!(highlights.contains(&"Data persistence".to_string()));
    }

    #[test]
    fn empty_cleanup_is_a_malformed_failure_with_placeholder() {
        let completion = ScriptedCompletion::repeating("```html\n```");
        let result = Coder::default().run(&completion, "a todo app", "plan", "");

        let StageResult::Failure {
            kind,
            fallback_text,
            ..
        } = &result
        else {
            panic!("expected failure");
        };
        assert_eq!(*kind, FailureKind::MalformedResponse);
        let fallback = fallback_text.as_deref().expect("placeholder");
        assert!(fallback.contains("a todo app"));
        assert!(fallback.contains("Generation failed"));
    }

    #[test]
    fn transport_failure_carries_placeholder_document() {
        let completion = FailingCompletion::new("gateway timeout");
        let result = Coder::default().run(&completion, "a notes app", "plan", "");

        let report = CodeReport::from_result(&result, "a notes app");
        assert!(!report.success);
        assert!(report.markup.starts_with("<!DOCTYPE html>"));
        assert!(report.markup.contains("a notes app"));
    }

    #[test]
    fn prompt_carries_plan_and_research() {
        let completion = ScriptedCompletion::repeating(FENCED_DOCUMENT);
        Coder::default().run(&completion, "idea", "the plan text", "the research text");
        let prompt = &completion.prompts()[0];
        assert!(prompt.contains("the plan text"));
        assert!(prompt.contains("the research text"));
    }
}
