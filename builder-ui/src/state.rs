//! Shared application state for the UI server.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use builder::io::config::{BuilderConfig, load_config};

/// Shared state accessible from all request handlers.
///
/// Deliberately small: every build or refinement request runs against its
/// own session and orchestrator, so nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BuilderConfig>,
}

impl AppState {
    pub fn from_config_path(path: &Path) -> Result<Self> {
        let config = load_config(path)?;
        Ok(Self {
            config: Arc::new(config),
        })
    }
}
