//! Append-only version ledger for one build or refinement session.
//!
//! The ledger records every artifact revision a session produces. It never
//! shrinks and is never edited in place; sequence numbers are assigned at
//! append time and stay contiguous from 1.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::Artifact;

/// One recorded artifact revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// 1-based sequence number; the Nth appended version has number N.
    pub number: u32,
    pub artifact: Artifact,
    /// Human-readable note for the history view ("Initial generation",
    /// "After fix 2", ...).
    pub description: String,
}

/// `current()` was called before any version was appended.
///
/// This is a precondition violation, not a runtime condition: the
/// orchestrator always appends before reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyLedgerError;

impl fmt::Display for EmptyLedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ledger has no versions yet")
    }
}

impl std::error::Error for EmptyLedgerError {}

/// Append-only ordered history of artifact versions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    versions: Vec<Version>,
}

impl Ledger {
    /// Create an empty ledger for a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new version and assign it the next sequence number.
    pub fn append(&mut self, artifact: Artifact, description: impl Into<String>) -> &Version {
        let number = self.versions.len() as u32 + 1;
        self.versions.push(Version {
            number,
            artifact,
            description: description.into(),
        });
        self.versions.last().expect("just pushed")
    }

    /// Read-only view of all versions in append order.
    pub fn all(&self) -> &[Version] {
        &self.versions
    }

    /// The artifact of the last appended version.
    pub fn current(&self) -> Result<&Artifact, EmptyLedgerError> {
        self.versions
            .last()
            .map(|v| &v.artifact)
            .ok_or(EmptyLedgerError)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StageName;

    #[test]
    fn append_assigns_contiguous_numbers_from_one() {
        let mut ledger = Ledger::new();
        ledger.append(Artifact::markup("a", StageName::Generate), "first");
        ledger.append(Artifact::markup("b", StageName::Repair), "second");
        ledger.append(Artifact::markup("c", StageName::Revise), "third");

        let numbers: Vec<u32> = ledger.all().iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn current_equals_last_appended_artifact() {
        let mut ledger = Ledger::new();
        ledger.append(Artifact::markup("a", StageName::Generate), "first");
        ledger.append(Artifact::markup("b", StageName::Repair), "second");

        let current = ledger.current().expect("non-empty");
        assert_eq!(current.content, "b");
        assert_eq!(
            current,
            &ledger.all().last().expect("last version").artifact
        );
    }

    #[test]
    fn current_on_empty_ledger_is_a_typed_error() {
        let ledger = Ledger::new();
        let err = ledger.current().unwrap_err();
        assert_eq!(err, EmptyLedgerError);
        assert!(err.to_string().contains("no versions"));
    }

    #[test]
    fn descriptions_are_preserved() {
        let mut ledger = Ledger::new();
        ledger.append(
            Artifact::markup("a", StageName::Revise),
            "Refinement: bigger button",
        );
        assert_eq!(ledger.all()[0].description, "Refinement: bigger button");
    }
}
