//! Changelog formatters

mod markdown;

pub use markdown::{MarkdownFormatter, CHANGELOG_HEADER};

use crate::types::ChangelogEntry;

/// Renders changelog entries and merges them into existing files
pub trait ChangelogFormatter: Send + Sync {
    /// Render one version section
    fn format(&self, entry: &ChangelogEntry) -> String;

    /// A complete document holding only `section`
    fn document(&self, section: &str) -> String;

    /// Insert `section` above the sections already in `existing`
    fn prepend(&self, existing: &str, section: &str) -> String;
}
