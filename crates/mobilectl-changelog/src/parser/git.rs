//! Commit parser backed by a git repository

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use mobilectl_core::config::CommitTypeConfig;
use mobilectl_core::error::ChangelogError;
use mobilectl_git::{CommitInfo, GitRepo};

use super::{CommitParser, ConventionalParser};
use crate::types::Commit;

/// Remote whose web URL is used for compare links
const COMPARE_REMOTE: &str = "origin";

/// Reads commits and tags from git and parses them as conventional commits
pub struct GitCommitParser {
    repo: GitRepo,
    parser: ConventionalParser,
}

impl GitCommitParser {
    /// Create a parser over an opened repository
    pub fn new(repo: GitRepo, commit_types: Vec<CommitTypeConfig>) -> Self {
        Self {
            repo,
            parser: ConventionalParser::new(commit_types),
        }
    }

    fn parse_all(&self, commits: Vec<CommitInfo>) -> Vec<Commit> {
        let total = commits.len();
        let parsed: Vec<Commit> = commits
            .iter()
            .filter_map(|c| self.parser.parse(c))
            .collect();
        debug!(
            total,
            conventional = parsed.len(),
            "parsed commits"
        );
        parsed
    }
}

impl CommitParser for GitCommitParser {
    #[instrument(skip(self))]
    fn parse_commits(
        &self,
        from_tag: Option<&str>,
        to_tag: Option<&str>,
    ) -> Result<Vec<Commit>, ChangelogError> {
        let commits = self.repo.commits_between(from_tag, to_tag)?;
        Ok(self.parse_all(commits))
    }

    #[instrument(skip(self))]
    fn parse_commits_since_hash(&self, hash: &str) -> Result<Vec<Commit>, ChangelogError> {
        let commits = self.repo.commits_since(hash)?;
        Ok(self.parse_all(commits))
    }

    fn latest_tag(&self) -> Result<Option<String>, ChangelogError> {
        Ok(self.repo.find_latest_tag()?.map(|t| t.name))
    }

    fn all_tags(&self) -> Result<Vec<String>, ChangelogError> {
        Ok(self.repo.tag_names()?)
    }

    fn tag_date(&self, tag: &str) -> Result<Option<DateTime<Utc>>, ChangelogError> {
        Ok(self.repo.tag_date(tag)?)
    }

    fn compare_url(&self, from_tag: &str, to_tag: &str) -> Result<String, ChangelogError> {
        Ok(self.repo.compare_url(COMPARE_REMOTE, from_tag, to_tag)?)
    }
}
