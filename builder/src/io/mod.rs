//! I/O helpers for the build pipeline.

pub mod completion;
pub mod config;
pub mod process;
