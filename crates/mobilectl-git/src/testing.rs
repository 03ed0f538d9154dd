//! Throwaway repositories for tests

use std::path::Path;

use git2::{Repository, Signature};
use tempfile::TempDir;

use crate::repository::GitRepo;

pub(crate) struct TestRepo {
    temp: TempDir,
    repo: Repository,
}

impl TestRepo {
    pub(crate) fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        Self { temp, repo }
    }

    pub(crate) fn path(&self) -> &Path {
        self.temp.path()
    }

    pub(crate) fn open(&self) -> GitRepo {
        GitRepo::open(self.temp.path()).unwrap()
    }

    /// Commit with the given full message, returning the new hash
    pub(crate) fn commit(&self, message: &str) -> String {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    pub(crate) fn tag(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .unwrap();
    }

    pub(crate) fn annotated_tag(&self, name: &str, message: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        let sig = Signature::now("Tagger", "tagger@example.com").unwrap();
        self.repo
            .tag(name, head.as_object(), &sig, message, false)
            .unwrap();
    }

    pub(crate) fn add_remote(&self, name: &str, url: &str) {
        self.repo.remote(name, url).unwrap();
    }
}
