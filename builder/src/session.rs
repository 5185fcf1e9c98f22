//! Per-conversation state.
//!
//! A `Session` covers one build or one refinement conversation. It is owned
//! by the caller and passed into orchestrator operations; nothing in this
//! crate holds session state in globals.

use crate::core::ledger::Ledger;

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub ledger: Ledger,
}

impl Session {
    /// Fresh session with an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}
