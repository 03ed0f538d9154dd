//! Commit history operations

use git2::{Oid, Sort};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

impl GitRepo {
    /// Commits reachable from `to` (default HEAD) but not from `from`.
    ///
    /// Both ends accept any revision git understands. Without `from` the
    /// whole history is returned. Results are newest first.
    #[instrument(skip(self))]
    pub fn commits_between(&self, from: Option<&str>, to: Option<&str>) -> Result<Vec<CommitInfo>> {
        let head = match to {
            Some(rev) => self.resolve_commit(rev)?,
            None => self.head_commit()?.id(),
        };
        let hide = from.map(|rev| self.resolve_commit(rev)).transpose()?;

        let commits = self.walk(head, hide)?;
        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }

    /// Get commits since a specific commit hash, excluding that commit
    pub fn commits_since(&self, since: &str) -> Result<Vec<CommitInfo>> {
        self.commits_between(Some(since), None)
    }

    /// Get all commits on the current branch
    pub fn all_commits(&self) -> Result<Vec<CommitInfo>> {
        self.commits_between(None, None)
    }

    fn walk(&self, head: Oid, hide: Option<Oid>) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;
        if let Some(hide) = hide {
            revwalk.hide(hide)?;
        }

        let mut commits = Vec::new();

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(CommitInfo::from(&commit));
        }

        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::TestRepo;

    #[test]
    fn test_all_commits_newest_first() {
        let repo = TestRepo::new();
        repo.commit("Initial commit");
        repo.commit("feat: add file");

        let commits = repo.open().all_commits().unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].subject(), "feat: add file");
        assert_eq!(commits[1].subject(), "Initial commit");
        assert_eq!(commits[0].author.as_deref(), Some("Test"));
    }

    #[test]
    fn test_commits_since_hash_excludes_it() {
        let repo = TestRepo::new();
        repo.commit("Initial commit");
        let marker = repo.commit("feat: one");
        repo.commit("fix: two");
        repo.commit("feat: three");

        let commits = repo.open().commits_since(&marker).unwrap();
        let messages: Vec<_> = commits.iter().map(|c| c.subject()).collect();
        assert_eq!(messages, vec!["feat: three", "fix: two"]);
    }

    #[test]
    fn test_commits_between_tags() {
        let repo = TestRepo::new();
        repo.commit("chore: init");
        repo.tag("v1.0.0");
        repo.commit("feat: login");
        repo.commit("fix: crash");
        repo.tag("v1.1.0");
        repo.commit("feat: unreleased");

        let git = repo.open();
        let range = git.commits_between(Some("v1.0.0"), Some("v1.1.0")).unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].subject(), "fix: crash");

        let since = git.commits_between(Some("v1.1.0"), None).unwrap();
        assert_eq!(since.len(), 1);
        assert_eq!(since[0].subject(), "feat: unreleased");
    }

    #[test]
    fn test_body_is_split_from_subject() {
        let repo = TestRepo::new();
        repo.commit("feat: api\n\nBREAKING CHANGE: removed v1 endpoints");

        let commits = repo.open().all_commits().unwrap();
        assert_eq!(commits[0].subject(), "feat: api");
        assert_eq!(commits[0].body(), Some("BREAKING CHANGE: removed v1 endpoints"));
    }

    #[test]
    fn test_unknown_from_revision_fails() {
        let repo = TestRepo::new();
        repo.commit("feat: one");
        assert!(repo.open().commits_since("deadbeef").is_err());
    }
}
