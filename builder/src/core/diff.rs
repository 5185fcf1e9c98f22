//! Line-level diffing between artifact revisions.
//!
//! Pure and deterministic: the same pair of inputs always yields the same
//! report, so callers may diff ledger entries repeatedly and concurrently.
//! Alignment uses LCS-based opcodes from the `similar` crate; lines are the
//! unit of comparison and line boundaries are preserved in the unified form.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, DiffTag, TextDiff};

/// Classification of one side-by-side row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Equal,
    Change,
    Add,
    Remove,
}

/// One aligned row of the side-by-side view. `left` is the old line,
/// `right` the new one; the absent side of an add/remove is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    pub left: String,
    pub right: String,
    pub kind: RowKind,
}

/// Full diff between two artifact revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Unified-diff text ("Previous Version" / "New Version" headers).
    /// Empty when the inputs are identical.
    pub unified: String,
    /// Side-by-side rows, aligned 1:1 by row index.
    pub rows: Vec<DiffRow>,
    pub added: usize,
    pub removed: usize,
    pub summary: String,
}

/// Compute the line diff between `old` and `new`.
pub fn diff(old: &str, new: &str) -> DiffReport {
    let text_diff = TextDiff::from_lines(old, new);

    let mut added = 0usize;
    let mut removed = 0usize;
    for change in text_diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }

    let unified = text_diff
        .unified_diff()
        .context_radius(3)
        .header("Previous Version", "New Version")
        .to_string();

    let mut rows = Vec::new();
    for op in text_diff.ops() {
        match op.tag() {
            DiffTag::Equal => {
                for change in text_diff.iter_changes(op) {
                    let line = trim_line_ending(change.value());
                    rows.push(DiffRow {
                        left: line.clone(),
                        right: line,
                        kind: RowKind::Equal,
                    });
                }
            }
            DiffTag::Delete => {
                for change in text_diff.iter_changes(op) {
                    rows.push(DiffRow {
                        left: trim_line_ending(change.value()),
                        right: String::new(),
                        kind: RowKind::Remove,
                    });
                }
            }
            DiffTag::Insert => {
                for change in text_diff.iter_changes(op) {
                    rows.push(DiffRow {
                        left: String::new(),
                        right: trim_line_ending(change.value()),
                        kind: RowKind::Add,
                    });
                }
            }
            DiffTag::Replace => {
                // Zip old against new pairwise; ragged remainders are padded
                // with empty counterpart lines so rows keep aligning 1:1.
                let mut lefts = Vec::new();
                let mut rights = Vec::new();
                for change in text_diff.iter_changes(op) {
                    match change.tag() {
                        ChangeTag::Delete => lefts.push(trim_line_ending(change.value())),
                        ChangeTag::Insert => rights.push(trim_line_ending(change.value())),
                        ChangeTag::Equal => {}
                    }
                }
                let len = lefts.len().max(rights.len());
                for i in 0..len {
                    rows.push(DiffRow {
                        left: lefts.get(i).cloned().unwrap_or_default(),
                        right: rights.get(i).cloned().unwrap_or_default(),
                        kind: RowKind::Change,
                    });
                }
            }
        }
    }

    let summary = summarize(added, removed);

    DiffReport {
        unified,
        rows,
        added,
        removed,
        summary,
    }
}

/// Human-readable change summary from line counts.
pub fn summarize(added: usize, removed: usize) -> String {
    match (added, removed) {
        (0, 0) => "No changes".to_string(),
        (a, 0) => format!("Added {a} lines"),
        (0, r) => format!("Removed {r} lines"),
        (a, r) => format!("Modified: +{a} / -{r} lines"),
    }
}

fn trim_line_ending(line: &str) -> String {
    line.trim_end_matches(['\r', '\n']).to_string()
}
