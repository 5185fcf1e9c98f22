//! Shared contract types for the build pipeline.
//!
//! These types define stable contracts between the stages, the orchestrator,
//! and the presentation layer. They are deterministic values with no I/O;
//! everything here serializes to a single JSON object per value so the
//! transport can frame events however it likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The stage that produced a given text or artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Research,
    Plan,
    Generate,
    Review,
    Repair,
    Revise,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Research => "research",
            StageName::Plan => "plan",
            StageName::Generate => "generate",
            StageName::Review => "review",
            StageName::Repair => "repair",
            StageName::Revise => "revise",
        }
    }
}

/// Why a stage call failed. Failures are values, never panics: the
/// orchestrator picks a fallback per kind instead of aborting the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The generation service was unreachable or returned an error.
    Transport,
    /// The service answered with no usable text.
    EmptyResponse,
    /// Text was present but unusable after cleanup.
    MalformedResponse,
}

/// Outcome of a single stage invocation.
///
/// Every stage call returns exactly one of these; transport errors are
/// caught at the stage boundary and converted to [`StageResult::Failure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum StageResult {
    Success {
        /// Post-processed stage output (cleaned document or analysis text).
        text: String,
        /// Best-effort rationale excerpt. Always non-empty; stages fall back
        /// to a deterministic string when extraction finds nothing.
        thinking: String,
        /// Best-effort bullet highlights (insights, components, features).
        highlights: Vec<String>,
    },
    Failure {
        kind: FailureKind,
        message: String,
        /// Replacement content the orchestrator may use for this phase.
        fallback_text: Option<String>,
    },
}

impl StageResult {
    pub fn is_success(&self) -> bool {
        matches!(self, StageResult::Success { .. })
    }

    /// Successful output text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            StageResult::Success { text, .. } => Some(text),
            StageResult::Failure { .. } => None,
        }
    }

    /// Failure kind, if this is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            StageResult::Success { .. } => None,
            StageResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// What kind of document an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Markup,
}

/// One immutable snapshot of the generated document.
///
/// A new revision is always a new `Artifact`; nothing in the core mutates
/// the content of an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub content: String,
    pub kind: ArtifactKind,
    pub source_stage: StageName,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Create a markup artifact stamped with the current time.
    pub fn markup(content: impl Into<String>, source_stage: StageName) -> Self {
        Self {
            content: content.into(),
            kind: ArtifactKind::Markup,
            source_stage,
            created_at: Utc::now(),
        }
    }
}

/// Workflow phase, in the order the build runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Chat,
    Research,
    Plan,
    Code,
    Test,
    Fix,
    Refine,
    Export,
}

impl Phase {
    /// Step number shown to the presentation layer. Numbers are part of the
    /// event contract and intentionally leave gaps (5 was a reserved
    /// preview step in the original workflow).
    pub fn step(self) -> u32 {
        match self {
            Phase::Chat => 0,
            Phase::Research => 1,
            Phase::Plan => 2,
            Phase::Code => 3,
            Phase::Test => 4,
            Phase::Fix => 6,
            Phase::Refine => 7,
            Phase::Export => 8,
        }
    }
}

/// Phase-boundary status carried on every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Starting,
    Complete,
    Passed,
    Failed,
}

/// One progress update emitted by the orchestrator.
///
/// Purely informational and one-directional: the orchestrator never reads
/// these back. Optional fields are omitted from the serialized form so each
/// event stays a compact standalone JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: u32,
    pub phase: Phase,
    pub status: EventStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_artifact: Option<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<crate::core::ledger::Version>>,
}

impl ProgressEvent {
    pub fn new(phase: Phase, status: EventStatus, message: impl Into<String>) -> Self {
        Self {
            step: phase.step(),
            phase,
            status,
            message: message.into(),
            iteration: None,
            payload: None,
            final_artifact: None,
            versions: None,
        }
    }

    pub fn starting(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(phase, EventStatus::Starting, message)
    }

    pub fn complete(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(phase, EventStatus::Complete, message)
    }

    pub fn with_iteration(mut self, iteration: u32) -> Self {
        self.iteration = Some(iteration);
        self
    }

    /// Attach a serialized stage report. Report types serialize
    /// infallibly; a missing payload here would be a bug in the report
    /// definition, not a runtime condition worth surfacing.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload = serde_json::to_value(payload).ok();
        self
    }

    pub fn with_final_artifact(mut self, artifact: Artifact) -> Self {
        self.final_artifact = Some(artifact);
        self
    }

    pub fn with_versions(mut self, versions: Vec<crate::core::ledger::Version>) -> Self {
        self.versions = Some(versions);
        self
    }
}
