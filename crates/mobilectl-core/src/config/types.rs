//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration for mobilectl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Current app version, used as the changelog section version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Changelog configuration
    pub changelog: ChangelogConfig,
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Whether to generate changelog
    pub enabled: bool,

    /// Changelog format (only "markdown" is supported)
    pub format: String,

    /// Changelog file path, relative to the project root
    #[serde(alias = "outputFile")]
    pub output_file: PathBuf,

    /// Tag to start from when no state is available
    #[serde(alias = "fromTag", skip_serializing_if = "Option::is_none")]
    pub from_tag: Option<String>,

    /// Prepend new sections to the existing file instead of replacing it
    pub append: bool,

    /// Resume from the last recorded commit
    #[serde(alias = "useLastState")]
    pub use_last_state: bool,

    /// Commit types to render, in section order
    #[serde(alias = "commitTypes")]
    pub commit_types: Vec<CommitTypeConfig>,

    /// Hand-written notes keyed by version
    pub releases: BTreeMap<String, ReleaseNotes>,

    /// Whether to include short commit hashes
    #[serde(alias = "includeHashes")]
    pub include_hashes: bool,

    /// Whether to include authors
    #[serde(alias = "includeAuthors")]
    pub include_authors: bool,

    /// Whether to render a compare link below the version header
    #[serde(alias = "includeCompareLink")]
    pub include_compare_link: bool,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: "markdown".to_string(),
            output_file: PathBuf::from("CHANGELOG.md"),
            from_tag: None,
            append: true,
            use_last_state: true,
            commit_types: vec![
                CommitTypeConfig::new("feat", "Features", "✨"),
                CommitTypeConfig::new("fix", "Bug Fixes", "🐛"),
                CommitTypeConfig::new("perf", "Performance", "⚡"),
                CommitTypeConfig::new("docs", "Documentation", "📚"),
            ],
            releases: BTreeMap::new(),
            include_hashes: true,
            include_authors: true,
            include_compare_link: false,
        }
    }
}

impl ChangelogConfig {
    /// Look up the configured entry for a commit type key
    pub fn commit_type(&self, key: &str) -> Option<&CommitTypeConfig> {
        self.commit_types
            .iter()
            .find(|t| t.key.eq_ignore_ascii_case(key))
    }

    /// Hand-written notes for a version, if any
    pub fn release_notes(&self, version: &str) -> Option<&ReleaseNotes> {
        self.releases
            .get(version)
            .or_else(|| self.releases.get(version.trim_start_matches('v')))
    }
}

/// A commit type that gets its own changelog section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTypeConfig {
    /// Conventional commit type (e.g. "feat")
    #[serde(rename = "type")]
    pub key: String,

    /// Section title
    pub label: String,

    /// Emoji shown before the section title
    #[serde(default)]
    pub emoji: String,
}

impl CommitTypeConfig {
    /// Create a new commit type entry
    pub fn new(key: impl Into<String>, label: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            emoji: emoji.into(),
        }
    }

    /// Section heading text, e.g. "✨ Features"
    pub fn heading(&self) -> String {
        if self.emoji.is_empty() {
            self.label.clone()
        } else {
            format!("{} {}", self.emoji, self.label)
        }
    }
}

/// Manually authored release notes merged into a version section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseNotes {
    /// Free text shown directly under the version header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,

    /// Extra breaking change lines
    #[serde(alias = "breakingChanges")]
    pub breaking_changes: Vec<String>,
}

impl ReleaseNotes {
    /// Whether these notes contribute anything
    pub fn is_empty(&self) -> bool {
        self.highlights
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
            && self.breaking_changes.is_empty()
    }
}
