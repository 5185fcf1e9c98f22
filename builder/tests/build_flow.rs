//! End-to-end build tests over scripted completion backends.
//!
//! These drive `Orchestrator::build` through whole workflows and verify the
//! event stream, the ledger, and the terminal artifact together.

use builder::agents::tester::ALL_CLEAR_SENTINEL;
use builder::core::types::{EventStatus, Phase, ProgressEvent};
use builder::io::config::BuilderConfig;
use builder::orchestrator::{BuildOutcome, BuildRequest, Orchestrator, ReviewOutcome};
use builder::session::Session;
use builder::test_support::{FailingCompletion, ScriptedCompletion};

const DOCUMENT: &str = "<!DOCTYPE html>\n<html><head><title>t</title></head>\
<body><main>plenty of perfectly valid content in here</main></body></html>";

fn quiet_config() -> BuilderConfig {
    BuilderConfig {
        phase_delay_ms: 0,
        ..BuilderConfig::default()
    }
}

fn run_build(
    completion: ScriptedCompletion,
    idea: &str,
    max_iterations: u32,
) -> (BuildOutcome, Vec<ProgressEvent>, Session) {
    let orchestrator = Orchestrator::new(completion, quiet_config());
    let mut session = Session::new();
    let mut events = Vec::new();
    let outcome = orchestrator.build(
        &mut session,
        &BuildRequest {
            idea: idea.to_string(),
            max_review_iterations: max_iterations,
        },
        |event| events.push(event),
    );
    (outcome, events, session)
}

#[test]
fn passing_review_exports_the_generated_document() {
    let completion = ScriptedCompletion::new(
        ["Starting!", "research notes", "the plan", DOCUMENT],
        ALL_CLEAR_SENTINEL,
    );
    let (outcome, events, session) = run_build(completion, "Todo app", 2);

    assert_eq!(outcome.review, ReviewOutcome::Passed { iterations: 1 });

    // One review cycle, no repairs.
    let test_events: Vec<EventStatus> = events
        .iter()
        .filter(|e| e.phase == Phase::Test)
        .map(|e| e.status)
        .collect();
    assert_eq!(test_events, vec![EventStatus::Starting, EventStatus::Passed]);
    assert!(events.iter().all(|e| e.phase != Phase::Fix));

    // The export carries exactly what generation produced.
    let export = events.last().expect("export event");
    assert_eq!(export.phase, Phase::Export);
    let artifact = export.final_artifact.as_ref().expect("final artifact");
    assert_eq!(artifact.content, DOCUMENT);
    assert_eq!(session.ledger.len(), 1);
}

#[test]
fn stubborn_reviewer_exhausts_iterations_and_still_exports() {
    let completion = ScriptedCompletion::new(
        ["ack", "research", "plan", DOCUMENT],
        "- the layout is still broken on mobile",
    );
    let (outcome, events, session) = run_build(completion, "Calculator", 2);

    assert_eq!(
        outcome.review,
        ReviewOutcome::IterationsExhausted { iterations: 2 }
    );
    let repairs = events
        .iter()
        .filter(|e| e.phase == Phase::Fix && e.status == EventStatus::Complete)
        .count();
    assert_eq!(repairs, 2);

    let export = events.last().expect("export event");
    assert_eq!(export.phase, Phase::Export);
    let artifact = export.final_artifact.as_ref().expect("final artifact");
    assert!(!artifact.content.is_empty());

    // Initial generation plus one version per repair, numbered from 1.
    let numbers: Vec<u32> = session.ledger.all().iter().map(|v| v.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn total_outage_degrades_to_placeholder_export() {
    let completion = FailingCompletion::new("service unreachable");
    let orchestrator = Orchestrator::new(completion, quiet_config());
    let mut session = Session::new();
    let mut events = Vec::new();

    let outcome = orchestrator.build(
        &mut session,
        &BuildRequest {
            idea: "X".to_string(),
            max_review_iterations: 1,
        },
        |event| events.push(event),
    );

    let export = events.last().expect("export event");
    assert_eq!(export.phase, Phase::Export);
    assert_eq!(export.status, EventStatus::Complete);
    assert!(outcome.final_artifact.content.contains("<!DOCTYPE html>"));

    // Every phase still reached a terminal event.
    for phase in [Phase::Chat, Phase::Research, Phase::Plan, Phase::Code] {
        assert!(
            events
                .iter()
                .any(|e| e.phase == phase && e.status != EventStatus::Starting),
            "missing terminal event for {phase:?}"
        );
    }
}

#[test]
fn starting_events_precede_their_terminal_events() {
    let completion = ScriptedCompletion::new(
        ["ack", "research", "plan", DOCUMENT],
        ALL_CLEAR_SENTINEL,
    );
    let (_, events, _) = run_build(completion, "Notes app", 1);

    for phase in [Phase::Research, Phase::Plan, Phase::Code, Phase::Test] {
        let start = events
            .iter()
            .position(|e| e.phase == phase && e.status == EventStatus::Starting);
        let done = events
            .iter()
            .position(|e| e.phase == phase && e.status != EventStatus::Starting);
        let (Some(start), Some(done)) = (start, done) else {
            panic!("missing events for {phase:?}");
        };
        assert!(start < done, "terminal before starting for {phase:?}");
    }
}

#[test]
fn events_serialize_one_json_object_each() {
    let completion = ScriptedCompletion::new(
        ["ack", "research", "plan", DOCUMENT],
        ALL_CLEAR_SENTINEL,
    );
    let (_, events, _) = run_build(completion, "Todo app", 1);

    for event in &events {
        let line = serde_json::to_string(event).expect("serialize event");
        assert!(!line.contains('\n'));
        let back: ProgressEvent = serde_json::from_str(&line).expect("round-trip");
        assert_eq!(&back, event);
    }

    let export = serde_json::to_value(events.last().expect("export")).expect("serialize");
    assert_eq!(export["step"], 8);
    assert!(export["final_artifact"]["content"].is_string());
    assert!(export["versions"].is_array());
}
