//! Incremental generation state

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use mobilectl_core::config::{STATE_FILE, TOOL_DIR};
use mobilectl_core::error::ChangelogError;

use crate::backup::write_atomically;
use crate::types::ChangelogState;

/// Persistence for the last generation marker
pub trait StateManager: Send + Sync {
    /// Load the state; a project that was never generated gets the empty state
    fn get_state(&self) -> Result<ChangelogState, ChangelogError>;

    /// Persist `state`
    fn save_state(&self, state: &ChangelogState) -> Result<bool, ChangelogError>;

    /// Forget everything, so the next run starts from the configured range
    fn clear_state(&self) -> Result<bool, ChangelogError>;
}

/// State kept as a JSON sidecar file
#[derive(Debug, Clone)]
pub struct JsonStateManager {
    path: PathBuf,
}

impl JsonStateManager {
    /// Create a manager for the given state file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manager using the project's `.mobilectl/changelog-state.json`
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join(TOOL_DIR).join(STATE_FILE))
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateManager for JsonStateManager {
    fn get_state(&self) -> Result<ChangelogState, ChangelogError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no changelog state yet");
                return Ok(ChangelogState::default());
            }
            Err(e) => return Err(ChangelogError::state(&self.path, e)),
        };

        serde_json::from_str(&content).map_err(|e| ChangelogError::state(&self.path, e))
    }

    #[instrument(skip(self, state), fields(path = %self.path.display()))]
    fn save_state(&self, state: &ChangelogState) -> Result<bool, ChangelogError> {
        let mut state = state.clone();

        // Never move the generation time backwards, even on clock skew
        let previous = self.get_state().ok().and_then(|s| s.last_generated_at);
        if let (Some(prev), Some(next)) = (previous, state.last_generated_at) {
            state.last_generated_at = Some(prev.max(next));
        }

        let mut json = serde_json::to_string_pretty(&state)?;
        json.push('\n');
        write_atomically(&self.path, json.as_bytes())
            .map_err(|e| ChangelogError::state(&self.path, e))?;

        info!(
            last_commit = state.last_commit_hash.as_deref().unwrap_or("-"),
            last_tag = state.last_tag.as_deref().unwrap_or("-"),
            "changelog state saved"
        );
        Ok(true)
    }

    fn clear_state(&self) -> Result<bool, ChangelogError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "changelog state cleared");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ChangelogError::state(&self.path, e)),
        }
    }
}
