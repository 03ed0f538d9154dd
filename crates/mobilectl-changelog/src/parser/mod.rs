//! Commit parsing

mod conventional;
mod git;

pub use conventional::{parse_commit_message, ConventionalParser, ParsedMessage};
pub use git::GitCommitParser;

use chrono::{DateTime, Utc};
use mobilectl_core::error::ChangelogError;

use crate::types::Commit;

/// Source of structured commits for a generation run.
///
/// Every method returns only commits whose subject follows the conventional
/// commit grammar; anything else is dropped. Lists are newest first.
pub trait CommitParser {
    /// Commits after `from_tag` (exclusive) up to `to_tag` (default HEAD)
    fn parse_commits(
        &self,
        from_tag: Option<&str>,
        to_tag: Option<&str>,
    ) -> Result<Vec<Commit>, ChangelogError>;

    /// Commits made after the given commit
    fn parse_commits_since_hash(&self, hash: &str) -> Result<Vec<Commit>, ChangelogError>;

    /// Highest versioned tag, if any
    fn latest_tag(&self) -> Result<Option<String>, ChangelogError>;

    /// All tag names, newest version first
    fn all_tags(&self) -> Result<Vec<String>, ChangelogError>;

    /// When a tag was created
    fn tag_date(&self, tag: &str) -> Result<Option<DateTime<Utc>>, ChangelogError>;

    /// Web link comparing two refs
    fn compare_url(&self, from_tag: &str, to_tag: &str) -> Result<String, ChangelogError>;
}
