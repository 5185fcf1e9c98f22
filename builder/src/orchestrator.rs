//! Workflow orchestration: phase ordering, the review/repair loop, version
//! recording and progress events.
//!
//! The orchestrator is deliberately boring: every stage call goes through
//! the same boundary, every phase emits `starting` before the call and a
//! terminal event after it, and no stage failure aborts the workflow. The
//! worst outcome of a build is an export event carrying placeholder content.
//!
//! Events are pushed through a caller-provided sink closure as they are
//! produced; transports adapt that to whatever framing they need (JSONL on
//! stdout, an SSE channel). Ordering is structural: no phase is invoked
//! before the previous phase's terminal event has been handed to the sink.

use std::thread;

use tracing::{debug, info};

use crate::agents::{
    self,
    architect::{Architect, PlanReport},
    coder::{CodeReport, Coder},
    debugger::{Debugger, PatchReport},
    researcher::{ResearchReport, Researcher},
    tester::{ReviewReport, Tester},
};
use crate::core::extract::truncate_chars;
use crate::core::types::{Artifact, EventStatus, Phase, ProgressEvent, StageName};
use crate::io::completion::Completion;
use crate::io::config::BuilderConfig;
use crate::session::Session;

/// Research excerpt cap when fed into planning and generation prompts.
const RESEARCH_EXCERPT_CHARS: usize = 500;
/// Review analysis cap when fed into the repair prompt.
const ANALYSIS_EXCERPT_CHARS: usize = 1_000;
/// Feedback excerpt cap inside refinement version descriptions.
const DESCRIPTION_FEEDBACK_CHARS: usize = 30;

/// One immutable build order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub idea: String,
    /// Upper bound on review/repair cycles. Zero skips review entirely.
    pub max_review_iterations: u32,
}

/// How the review/repair loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// A review passed on the given 1-based iteration.
    Passed { iterations: u32 },
    /// All allowed cycles ran without a pass. Not an error; the last
    /// repaired document ships as-is.
    IterationsExhausted { iterations: u32 },
    /// Review never ran (`max_review_iterations` was zero).
    Skipped,
}

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub review: ReviewOutcome,
    pub final_artifact: Artifact,
}

/// Summary of a finished refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineOutcome {
    pub version_number: u32,
    pub final_artifact: Artifact,
}

pub struct Orchestrator<C: Completion> {
    completion: C,
    config: BuilderConfig,
    researcher: Researcher,
    architect: Architect,
    coder: Coder,
    tester: Tester,
    debugger: Debugger,
}

impl<C: Completion> Orchestrator<C> {
    pub fn new(completion: C, config: BuilderConfig) -> Self {
        Self {
            completion,
            config,
            researcher: Researcher::default(),
            architect: Architect::default(),
            coder: Coder::default(),
            tester: Tester::default(),
            debugger: Debugger::default(),
        }
    }

    /// Run a full build: chat-ack, research, plan, generate, bounded
    /// review/repair, export.
    ///
    /// Expects a fresh session; every generated revision is appended to its
    /// ledger. The returned outcome summarizes the terminal state; the full
    /// story is in the events pushed through `sink`.
    pub fn build(
        &self,
        session: &mut Session,
        request: &BuildRequest,
        mut sink: impl FnMut(ProgressEvent),
    ) -> BuildOutcome {
        info!(idea = %request.idea, max_iterations = request.max_review_iterations, "build started");

        let ack = agents::acknowledge(&self.completion, &request.idea, "");
        sink(ProgressEvent::complete(Phase::Chat, ack));
        self.pause();

        sink(ProgressEvent::starting(
            Phase::Research,
            "Researching best practices and similar products...",
        ));
        let research = ResearchReport::from_result(&self.researcher.run(&self.completion, &request.idea));
        sink(ProgressEvent::complete(Phase::Research, "Research complete.").with_payload(&research));
        self.pause();

        let research_excerpt = truncate_chars(&research.summary, RESEARCH_EXCERPT_CHARS);

        sink(ProgressEvent::starting(
            Phase::Plan,
            "Designing the application architecture...",
        ));
        let plan = PlanReport::from_result(
            &self.architect.run(&self.completion, &request.idea, &research_excerpt),
            &request.idea,
        );
        sink(ProgressEvent::complete(Phase::Plan, "Plan ready.").with_payload(&plan));
        self.pause();

        sink(ProgressEvent::starting(
            Phase::Code,
            "Writing the application code...",
        ));
        let code = CodeReport::from_result(
            &self
                .coder
                .run(&self.completion, &request.idea, &plan.plan, &research_excerpt),
            &request.idea,
        );
        let mut artifact = Artifact::markup(code.markup.clone(), StageName::Generate);
        session.ledger.append(artifact.clone(), "Initial generation");
        sink(ProgressEvent::complete(Phase::Code, "Code generated.").with_payload(&code));
        self.pause();

        let mut review = ReviewOutcome::Skipped;
        for iteration in 1..=request.max_review_iterations {
            sink(
                ProgressEvent::starting(Phase::Test, "Validating the generated application...")
                    .with_iteration(iteration),
            );
            let verdict = self
                .tester
                .run(&self.completion, &artifact.content, &request.idea);
            let report = ReviewReport::from_verdict(&verdict);

            if verdict.passed {
                sink(
                    ProgressEvent::new(Phase::Test, EventStatus::Passed, "All checks passed.")
                        .with_iteration(iteration)
                        .with_payload(&report),
                );
                review = ReviewOutcome::Passed { iterations: iteration };
                break;
            }
            sink(
                ProgressEvent::new(
                    Phase::Test,
                    EventStatus::Failed,
                    "Issues found, preparing fixes.",
                )
                .with_iteration(iteration)
                .with_payload(&report),
            );
            self.pause();

            sink(
                ProgressEvent::starting(Phase::Fix, "Applying fixes...").with_iteration(iteration),
            );
            let issues = truncate_chars(&verdict.analysis, ANALYSIS_EXCERPT_CHARS);
            let patch = PatchReport::from_result(
                &self.debugger.fix(&self.completion, &artifact.content, &issues),
                &artifact.content,
            );
            artifact = Artifact::markup(patch.markup.clone(), StageName::Repair);
            session
                .ledger
                .append(artifact.clone(), format!("After fix {iteration}"));
            sink(
                ProgressEvent::complete(Phase::Fix, "Fixes applied.")
                    .with_iteration(iteration)
                    .with_payload(&patch),
            );
            self.pause();

            if iteration == request.max_review_iterations {
                review = ReviewOutcome::IterationsExhausted { iterations: iteration };
            }
        }
        debug!(?review, versions = session.ledger.len(), "review loop finished");

        sink(
            ProgressEvent::complete(Phase::Export, "Build complete. Your application is ready.")
                .with_final_artifact(artifact.clone())
                .with_versions(session.ledger.all().to_vec()),
        );
        info!("build finished");

        BuildOutcome {
            review,
            final_artifact: artifact,
        }
    }

    /// Apply one round of user feedback to an existing document.
    ///
    /// Appends exactly one version to the session ledger; the terminal
    /// event carries the refined artifact plus the full version history.
    pub fn refine(
        &self,
        session: &mut Session,
        markup: &str,
        feedback: &str,
        mut sink: impl FnMut(ProgressEvent),
    ) -> RefineOutcome {
        info!(feedback_bytes = feedback.len(), "refinement started");

        let ack = agents::acknowledge(
            &self.completion,
            feedback,
            "The user is asking for a change to an app you already built.",
        );
        sink(ProgressEvent::complete(Phase::Chat, ack));
        self.pause();

        sink(ProgressEvent::starting(
            Phase::Refine,
            "Applying your requested changes...",
        ));
        let patch = PatchReport::from_result(
            &self.debugger.refine(&self.completion, markup, feedback),
            markup,
        );
        let artifact = Artifact::markup(patch.markup.clone(), StageName::Revise);
        let description = format!(
            "Refinement: {}",
            truncate_chars(feedback.trim(), DESCRIPTION_FEEDBACK_CHARS)
        );
        let version_number = session.ledger.append(artifact.clone(), description).number;
        sink(
            ProgressEvent::complete(Phase::Refine, "Refinement complete.")
                .with_payload(&patch)
                .with_final_artifact(artifact.clone())
                .with_versions(session.ledger.all().to_vec()),
        );
        info!(version = version_number, "refinement finished");

        RefineOutcome {
            version_number,
            final_artifact: artifact,
        }
    }

    // Pacing between phases is cosmetic; ordering never depends on it.
    fn pause(&self) {
        let delay = self.config.phase_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::tester::ALL_CLEAR_SENTINEL;
    use crate::test_support::{FailingCompletion, ScriptedCompletion};

    const DOCUMENT: &str = "<!DOCTYPE html>\n<html><body><main>a perfectly fine app body with enough length</main></body></html>";

    fn quiet_config() -> BuilderConfig {
        BuilderConfig {
            phase_delay_ms: 0,
            ..BuilderConfig::default()
        }
    }

    fn collect(events: &mut Vec<ProgressEvent>) -> impl FnMut(ProgressEvent) + '_ {
        |event| events.push(event)
    }

    #[test]
    fn build_emits_phases_in_strict_order() {
        // ack, research, plan, code, review (passes first try)
        let completion = ScriptedCompletion::new(
            ["On it!", "findings", "a plan", DOCUMENT],
            ALL_CLEAR_SENTINEL,
        );
        let orchestrator = Orchestrator::new(completion, quiet_config());
        let mut session = Session::new();
        let mut events = Vec::new();

        let outcome = orchestrator.build(
            &mut session,
            &BuildRequest {
                idea: "todo app".to_string(),
                max_review_iterations: 2,
            },
            collect(&mut events),
        );

        let phases: Vec<(Phase, EventStatus)> =
            events.iter().map(|e| (e.phase, e.status)).collect();
        assert_eq!(
            phases,
            vec![
                (Phase::Chat, EventStatus::Complete),
                (Phase::Research, EventStatus::Starting),
                (Phase::Research, EventStatus::Complete),
                (Phase::Plan, EventStatus::Starting),
                (Phase::Plan, EventStatus::Complete),
                (Phase::Code, EventStatus::Starting),
                (Phase::Code, EventStatus::Complete),
                (Phase::Test, EventStatus::Starting),
                (Phase::Test, EventStatus::Passed),
                (Phase::Export, EventStatus::Complete),
            ]
        );
        assert_eq!(outcome.review, ReviewOutcome::Passed { iterations: 1 });
        assert_eq!(session.ledger.len(), 1);
    }

    #[test]
    fn failing_reviews_run_exactly_the_allowed_repair_cycles() {
        let completion = ScriptedCompletion::new(
            ["ack", "findings", "a plan", DOCUMENT],
            "- the header is broken and looks off",
        );
        let orchestrator = Orchestrator::new(completion, quiet_config());
        let mut session = Session::new();
        let mut events = Vec::new();

        let outcome = orchestrator.build(
            &mut session,
            &BuildRequest {
                idea: "calculator".to_string(),
                max_review_iterations: 2,
            },
            collect(&mut events),
        );

        assert_eq!(
            outcome.review,
            ReviewOutcome::IterationsExhausted { iterations: 2 }
        );
        let fix_completes = events
            .iter()
            .filter(|e| e.phase == Phase::Fix && e.status == EventStatus::Complete)
            .count();
        assert_eq!(fix_completes, 2);
        // Initial generation plus one version per repair.
        assert_eq!(session.ledger.len(), 3);
        assert_eq!(session.ledger.all()[1].description, "After fix 1");
        assert_eq!(session.ledger.all()[2].description, "After fix 2");
    }

    #[test]
    fn zero_iterations_skip_review_entirely() {
        let completion =
            ScriptedCompletion::new(["ack", "findings", "a plan", DOCUMENT], "unused");
        let orchestrator = Orchestrator::new(completion, quiet_config());
        let mut session = Session::new();
        let mut events = Vec::new();

        let outcome = orchestrator.build(
            &mut session,
            &BuildRequest {
                idea: "x".to_string(),
                max_review_iterations: 0,
            },
            collect(&mut events),
        );

        assert_eq!(outcome.review, ReviewOutcome::Skipped);
        assert!(events.iter().all(|e| e.phase != Phase::Test));
        assert_eq!(session.ledger.len(), 1);
    }

    #[test]
    fn total_service_outage_still_exports_a_placeholder() {
        let completion = FailingCompletion::new("everything is down");
        let orchestrator = Orchestrator::new(completion, quiet_config());
        let mut session = Session::new();
        let mut events = Vec::new();

        let outcome = orchestrator.build(
            &mut session,
            &BuildRequest {
                idea: "notes app".to_string(),
                max_review_iterations: 1,
            },
            collect(&mut events),
        );

        let export = events.last().expect("export event");
        assert_eq!(export.phase, Phase::Export);
        assert!(outcome.final_artifact.content.contains("notes app"));
        // Review fails open when the reviewer is unreachable.
        assert_eq!(outcome.review, ReviewOutcome::Passed { iterations: 1 });
    }

    #[test]
    fn refine_appends_one_version_with_truncated_feedback() {
        let completion = ScriptedCompletion::new(
            ["sure thing"],
            "<!DOCTYPE html><html><body>v2</body></html>",
        );
        let orchestrator = Orchestrator::new(completion, quiet_config());
        let mut session = Session::new();
        session
            .ledger
            .append(Artifact::markup(DOCUMENT, StageName::Generate), "Initial generation");
        let mut events = Vec::new();

        let feedback = "make the button much bigger and more colorful please";
        let outcome = orchestrator.refine(&mut session, DOCUMENT, feedback, collect(&mut events));

        assert_eq!(outcome.version_number, 2);
        assert_eq!(session.ledger.len(), 2);
        let description = &session.ledger.all()[1].description;
        assert_eq!(description, "Refinement: make the button much bigger an");

        let terminal = events.last().expect("terminal event");
        assert_eq!(terminal.phase, Phase::Refine);
        assert_eq!(
            terminal.versions.as_ref().map(Vec::len),
            Some(2)
        );
        assert!(terminal.final_artifact.is_some());
    }

    #[test]
    fn research_excerpt_into_generation_is_capped() {
        let long_research = "r".repeat(2_000);
        let completion = ScriptedCompletion::new(
            ["ack", long_research.as_str(), "a plan", DOCUMENT],
            ALL_CLEAR_SENTINEL,
        );
        let orchestrator = Orchestrator::new(completion, quiet_config());
        let mut session = Session::new();

        orchestrator.build(
            &mut session,
            &BuildRequest {
                idea: "x".to_string(),
                max_review_iterations: 1,
            },
            |_| {},
        );

        let prompts = orchestrator.completion.prompts();
        // Prompt 3 is generation; it carries at most 500 research chars.
        assert!(prompts[3].contains(&"r".repeat(500)));
        assert!(!prompts[3].contains(&"r".repeat(501)));
    }
}
