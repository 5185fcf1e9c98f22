//! Deterministic, pure logic shared by the pipeline core.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod diff;
pub mod extract;
pub mod ledger;
pub mod types;
