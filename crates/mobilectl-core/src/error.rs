//! Error types for mobilectl

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using MobilectlError
pub type Result<T> = std::result::Result<T, MobilectlError>;

/// Main error type for mobilectl operations
#[derive(Debug, Error)]
pub enum MobilectlError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Validation reported error-severity issues
    #[error("Validation failed with {0} error(s)")]
    ValidationFailed(usize),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Revision could not be resolved
    #[error("Unknown revision: {0}")]
    UnknownRevision(String),

    /// Tag not found
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// Remote URL is not a recognised hosting URL
    #[error("Unsupported remote URL: {0}")]
    UnsupportedRemote(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// The resolved commit range contained nothing to render
    #[error("No commits found {0}")]
    NoCommits(String),

    /// A generation run reported failure
    #[error("Changelog generation failed: {0}")]
    GenerationFailed(String),

    /// Failed to parse commit
    #[error("Failed to parse commit: {0}")]
    ParseFailed(String),

    /// Backup id does not exist in the backup directory
    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    /// Failed to create, restore or delete a backup
    #[error("Backup failed for {path}: {reason}")]
    BackupFailed { path: PathBuf, reason: String },

    /// Failed to write changelog
    #[error("Failed to write changelog {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Failed to persist or load generation state
    #[error("Changelog state error at {path}: {reason}")]
    StateFailed { path: PathBuf, reason: String },

    /// Git error while collecting commits
    #[error(transparent)]
    Git(#[from] GitError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChangelogError {
    /// Build a backup failure from any displayable cause
    pub fn backup(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::BackupFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a write failure from any displayable cause
    pub fn write(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::WriteFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a state failure from any displayable cause
    pub fn state(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::StateFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_commits_message() {
        let err = ChangelogError::NoCommits("since v1.0.0".to_string());
        assert_eq!(err.to_string(), "No commits found since v1.0.0");
    }

    #[test]
    fn test_git_error_is_transparent() {
        let err: MobilectlError = GitError::TagNotFound("v9.9.9".to_string()).into();
        assert_eq!(err.to_string(), "Tag not found: v9.9.9");
    }
}
