//! Multi-stage pipeline that turns a one-line app idea into a single-file
//! web application.
//!
//! A build runs research, planning, generation and a bounded review/repair
//! loop over a pluggable text-completion backend, recording every document
//! revision in an append-only version ledger. The architecture enforces a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (contract types, ledger, diff,
//!   text extraction). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (completion subprocess, config
//!   files). Isolated to enable scripted backends in tests.
//!
//! [`orchestrator`] coordinates [`agents`] with the session ledger and
//! pushes progress events to the caller; transports (CLI, HTTP) only frame
//! those events.

pub mod agents;
pub mod core;
pub mod io;
pub mod logging;
pub mod orchestrator;
pub mod prompt;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
