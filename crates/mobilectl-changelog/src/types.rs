//! Changelog types

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conventional commit, parsed once per generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit hash
    pub hash: String,
    /// Abbreviated hash (first 7 characters)
    pub short_hash: String,
    /// Commit type (feat, fix, etc.)
    pub commit_type: String,
    /// Scope (optional, in parentheses)
    pub scope: Option<String>,
    /// Commit description, verbatim
    pub message: String,
    /// Commit body
    pub body: Option<String>,
    /// Author name
    pub author: Option<String>,
    /// Commit timestamp
    pub date: DateTime<Utc>,
    /// Whether this is a breaking change
    pub breaking: bool,
    /// Text of the `BREAKING CHANGE:` footer, if any
    pub breaking_note: Option<String>,
}

/// A rendered section: one configured commit type and its commits
#[derive(Debug, Clone)]
pub struct Section {
    /// Heading text, e.g. "✨ Features"
    pub heading: String,
    /// Commits in this section
    pub commits: Vec<Commit>,
}

impl Section {
    /// Create a new section
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            commits: Vec::new(),
        }
    }

    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// A single line of the breaking changes subsection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingChange {
    /// Main text
    pub description: String,
    /// Scope of the originating commit
    pub scope: Option<String>,
    /// Additional detail from the commit footer
    pub note: Option<String>,
}

impl BreakingChange {
    /// Breaking change derived from a commit
    pub fn from_commit(commit: &Commit) -> Self {
        Self {
            description: commit.message.clone(),
            scope: commit.scope.clone(),
            note: commit.breaking_note.clone(),
        }
    }

    /// Breaking change written by hand in the release notes
    pub fn manual(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            scope: None,
            note: None,
        }
    }
}

/// The changelog content for one version
#[derive(Debug, Clone)]
pub struct ChangelogEntry {
    /// Version string
    pub version: String,
    /// Release date
    pub date: DateTime<Utc>,
    /// Link comparing this release with the previous one
    pub compare_url: Option<String>,
    /// Hand-written highlights
    pub highlights: Option<String>,
    /// Sections in configured order
    pub sections: Vec<Section>,
    /// Breaking changes (rendered after the sections)
    pub breaking_changes: Vec<BreakingChange>,
}

impl ChangelogEntry {
    /// Create a new changelog entry
    pub fn new(version: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            date,
            compare_url: None,
            highlights: None,
            sections: Vec::new(),
            breaking_changes: Vec::new(),
        }
    }

    /// Add a section, skipping empty ones
    pub fn add_section(&mut self, section: Section) {
        if !section.is_empty() {
            self.sections.push(section);
        }
    }
}

/// A snapshot of a file taken before it was overwritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupInfo {
    /// `<basename>@<YYYY-MM-DD_HH-mm-ss-SSS>`
    pub id: String,
    /// Creation time encoded in the id
    pub timestamp: DateTime<Utc>,
    /// Location of the backup copy
    pub file_path: PathBuf,
    /// Size of the backup in bytes
    pub size: u64,
}

/// What has already been written to the changelog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangelogState {
    /// Newest commit included in the last generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit_hash: Option<String>,
    /// Latest tag at the time of the last generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tag: Option<String>,
    /// Version the last section was rendered for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_version: Option<String>,
    /// When the last generation was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_generated_at: Option<DateTime<Utc>>,
}

impl ChangelogState {
    /// True when nothing has been generated yet
    pub fn is_empty(&self) -> bool {
        self.last_commit_hash.is_none() && self.last_tag.is_none()
    }
}

/// Outcome of one generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationResult {
    /// Whether the run succeeded
    pub success: bool,
    /// Rendered changelog document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Number of conventional commits in the range
    pub commit_count: usize,
    /// Error message when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Version the section was rendered for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// File that was (or would have been) written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl GenerationResult {
    /// A failed run
    pub fn failure(error: impl Into<String>, commit_count: usize) -> Self {
        Self {
            success: false,
            commit_count,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ignores_unknown_fields() {
        let json = r#"{
            "lastCommitHash": "abc123",
            "lastGeneratedAt": "2026-01-02T03:04:05Z",
            "generator": "some-future-version",
            "stats": {"sections": 3}
        }"#;
        let state: ChangelogState = serde_json::from_str(json).unwrap();
        assert_eq!(state.last_commit_hash.as_deref(), Some("abc123"));
        assert!(state.last_generated_at.is_some());
        assert!(!state.is_empty());
    }

    #[test]
    fn test_default_state_is_empty() {
        assert!(ChangelogState::default().is_empty());
    }

    #[test]
    fn test_section_skipped_when_empty() {
        let mut entry = ChangelogEntry::new("1.0.0", Utc::now());
        entry.add_section(Section::new("✨ Features"));
        assert!(entry.sections.is_empty());
    }

    #[test]
    fn test_failure_result() {
        let result = GenerationResult::failure("No commits found", 0);
        assert!(!result.success);
        assert!(result.content.is_none());
        assert_eq!(result.error.as_deref(), Some("No commits found"));
    }
}
