//! Configuration validation
//!
//! Validation never aborts on the first problem: every check contributes a
//! field-tagged [`ValidationIssue`], and callers decide what to do with
//! warnings versus errors.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{ChangelogConfig, Config};

/// Supported changelog formats
pub const VALID_FORMATS: &[&str] = &["markdown"];

/// How serious a validation issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Generation must not run
    Error,
    /// Generation can run but the output may surprise
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single problem found in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field
    pub field: String,
    /// Human-readable explanation
    pub message: String,
    /// Severity
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// Validate the whole configuration, returning every issue found
pub fn validate(config: &Config) -> Vec<ValidationIssue> {
    debug!("validating configuration");
    let issues = validate_changelog_config(&config.changelog);
    debug!(issue_count = issues.len(), "configuration validated");
    issues
}

/// Validate configuration, failing on the first error-severity issue
pub fn validate_config(config: &Config) -> Result<()> {
    match validate(config)
        .into_iter()
        .find(|i| i.severity == Severity::Error)
    {
        Some(issue) => Err(ConfigError::InvalidValue {
            field: issue.field,
            message: issue.message,
        }
        .into()),
        None => Ok(()),
    }
}

/// Validate the changelog section
pub fn validate_changelog_config(config: &ChangelogConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !VALID_FORMATS.contains(&config.format.as_str()) {
        issues.push(ValidationIssue::error(
            "changelog.format",
            format!("must be one of: {}", VALID_FORMATS.join(", ")),
        ));
    }

    if config.output_file.as_os_str().is_empty() {
        issues.push(ValidationIssue::error(
            "changelog.output_file",
            "output file cannot be empty",
        ));
    }

    if config.commit_types.is_empty() {
        issues.push(ValidationIssue::error(
            "changelog.commit_types",
            "at least one commit type is required",
        ));
    }

    let mut seen = HashSet::new();
    for (i, commit_type) in config.commit_types.iter().enumerate() {
        if commit_type.key.trim().is_empty() {
            issues.push(ValidationIssue::error(
                format!("changelog.commit_types[{}].type", i),
                "commit type cannot be empty",
            ));
        } else if !seen.insert(commit_type.key.to_lowercase()) {
            issues.push(ValidationIssue::error(
                format!("changelog.commit_types[{}].type", i),
                format!("duplicate commit type '{}'", commit_type.key),
            ));
        }

        if commit_type.label.trim().is_empty() {
            issues.push(ValidationIssue::warning(
                format!("changelog.commit_types[{}].label", i),
                "label is empty, the section heading will be blank",
            ));
        }
    }

    for (version, notes) in &config.releases {
        if notes.is_empty() {
            issues.push(ValidationIssue::warning(
                format!("changelog.releases.{}", version),
                "release notes have no highlights or breaking changes",
            ));
        }
    }

    issues
}
