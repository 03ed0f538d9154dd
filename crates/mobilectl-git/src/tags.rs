//! Tag operations

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::{to_utc, TagInfo};
use mobilectl_core::error::GitError;

impl GitRepo {
    /// Get all tags
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            if let Ok(commit) = self.repo.find_commit(oid) {
                tags.push(TagInfo::new(name, to_utc(commit.time().seconds())));
            } else if let Ok(tag) = self.repo.find_tag(oid) {
                let seconds = match (tag.tagger(), tag.target().and_then(|t| t.peel_to_commit())) {
                    (Some(tagger), _) => Some(tagger.when().seconds()),
                    (None, Ok(commit)) => Some(commit.time().seconds()),
                    (None, Err(_)) => None,
                };
                match seconds {
                    Some(seconds) => tags.push(TagInfo::new(name, to_utc(seconds))),
                    None => debug!(tag = %name, "skipping tag without a date"),
                }
            }

            true
        })?;

        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }

    /// Tag names sorted by version, newest first; unversioned tags follow by name
    pub fn tag_names(&self) -> Result<Vec<String>> {
        let mut tags = self.tags()?;
        tags.sort_by(|a, b| match (&a.version, &b.version) {
            (Some(va), Some(vb)) => vb.cmp(va),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });

        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    /// Find the latest tag by semantic version
    #[instrument(skip(self))]
    pub fn find_latest_tag(&self) -> Result<Option<TagInfo>> {
        let latest = self
            .tags()?
            .into_iter()
            .filter(|t| t.version.is_some())
            .max_by(|a, b| a.version.cmp(&b.version));

        debug!(latest = ?latest.as_ref().map(|t| &t.name), "found latest tag");
        Ok(latest)
    }

    /// Find a specific tag by name
    pub fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        Ok(self.tags()?.into_iter().find(|t| t.name == name))
    }

    /// Date of a tag: tagger date when annotated, commit date otherwise
    pub fn tag_date(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        match self.find_tag(name)? {
            Some(tag) => Ok(Some(tag.date)),
            None => Err(GitError::TagNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestRepo;
    use semver::Version;

    fn setup_repo_with_tags() -> TestRepo {
        let repo = TestRepo::new();
        repo.commit("Initial commit");
        repo.tag("v1.0.0");
        repo.commit("feat: second");
        repo.annotated_tag("v1.2.0", "Release 1.2.0");
        repo.commit("feat: third");
        repo.tag("nightly");
        repo
    }

    #[test]
    fn test_list_tags() {
        let repo = setup_repo_with_tags();
        let tags = repo.open().tags().unwrap();
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_tag_names_ordered_by_version() {
        let repo = setup_repo_with_tags();
        let names = repo.open().tag_names().unwrap();
        assert_eq!(names, vec!["v1.2.0", "v1.0.0", "nightly"]);
    }

    #[test]
    fn test_find_latest_tag() {
        let repo = setup_repo_with_tags();
        let tag = repo.open().find_latest_tag().unwrap().unwrap();
        assert_eq!(tag.name, "v1.2.0");
        assert_eq!(tag.version, Some(Version::new(1, 2, 0)));
    }

    #[test]
    fn test_annotated_tag_is_listed() {
        let repo = TestRepo::new();
        repo.commit("feat: tagged");
        repo.annotated_tag("android-v3.0.0", "three");

        let tag = repo.open().find_tag("android-v3.0.0").unwrap().unwrap();
        assert_eq!(tag.version, Some(Version::new(3, 0, 0)));
        assert!(repo.open().commits_since("android-v3.0.0").unwrap().is_empty());
    }

    #[test]
    fn test_tag_date() {
        let repo = setup_repo_with_tags();
        let git = repo.open();
        assert!(git.tag_date("v1.0.0").unwrap().is_some());
        assert!(git.tag_date("v1.2.0").unwrap().is_some());
        assert!(matches!(git.tag_date("v9.0.0"), Err(GitError::TagNotFound(_))));
    }

    #[test]
    fn test_no_tags() {
        let repo = TestRepo::new();
        repo.commit("Initial commit");
        assert!(repo.open().find_latest_tag().unwrap().is_none());
    }
}
