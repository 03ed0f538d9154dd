//! Exit codes for the CLI

use mobilectl_core::error::{ChangelogError, ConfigError, GitError, MobilectlError};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Changelog generation produced no output
pub const GENERATION_FAILED: i32 = 4;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// Backup id does not exist
pub const BACKUP_NOT_FOUND: i32 = 6;

/// Map an error bubbling out of a command to a process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<MobilectlError>() {
        return match e {
            MobilectlError::Config(e) => for_config_error(e),
            MobilectlError::Git(_) => GIT_ERROR,
            MobilectlError::Changelog(e) => for_changelog_error(e),
            MobilectlError::Io(_) | MobilectlError::Other(_) => ERROR,
        };
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return for_config_error(e);
    }
    if err.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }
    if let Some(e) = err.downcast_ref::<ChangelogError>() {
        return for_changelog_error(e);
    }
    ERROR
}

fn for_config_error(err: &ConfigError) -> i32 {
    match err {
        ConfigError::ValidationFailed(_) => VALIDATION_ERROR,
        _ => CONFIG_ERROR,
    }
}

fn for_changelog_error(err: &ChangelogError) -> i32 {
    match err {
        ChangelogError::Git(_) => GIT_ERROR,
        ChangelogError::BackupNotFound(_) => BACKUP_NOT_FOUND,
        ChangelogError::NoCommits(_) | ChangelogError::GenerationFailed(_) => GENERATION_FAILED,
        _ => ERROR,
    }
}
