//! Remote operations and hosting URLs

use tracing::{debug, instrument};
use url::Url;

use crate::repository::{GitRepo, Result};
use mobilectl_core::error::GitError;

impl GitRepo {
    /// Get the URL for a remote
    pub fn remote_url(&self, name: &str) -> Result<String> {
        match self.repo.find_remote(name) {
            Ok(remote) => remote
                .url()
                .map(|s| s.to_string())
                .ok_or_else(|| GitError::RemoteNotFound(name.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(GitError::RemoteNotFound(name.to_string()))
            }
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Web link comparing two refs on the hosting service behind `remote`
    #[instrument(skip(self))]
    pub fn compare_url(&self, remote: &str, from: &str, to: &str) -> Result<String> {
        let remote_url = self.remote_url(remote)?;
        let base = web_url(&remote_url).ok_or(GitError::UnsupportedRemote(remote_url))?;
        let link = compare_url(&base, from, to);
        debug!(%link, "built compare url");
        Ok(link)
    }
}

/// Convert a clone URL (https, ssh or scp-like) into the repository's web URL
pub fn web_url(remote_url: &str) -> Option<String> {
    let remote_url = remote_url.trim();

    let (host, path) = match Url::parse(remote_url) {
        Ok(url) if matches!(url.scheme(), "https" | "http" | "ssh" | "git") => {
            (url.host_str()?.to_string(), url.path().to_string())
        }
        _ => {
            // scp-like syntax: git@github.com:owner/repo.git
            let (user_host, path) = remote_url.split_once(':')?;
            let host = user_host.rsplit('@').next()?;
            if host.is_empty() || host.contains('/') {
                return None;
            }
            (host.to_string(), path.to_string())
        }
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    Some(format!("https://{}/{}", host, path))
}

/// Compare link between two refs for a repository web URL
pub fn compare_url(web_url: &str, from: &str, to: &str) -> String {
    let base = web_url.trim_end_matches('/');
    if base.contains("bitbucket.org") {
        format!("{}/branches/compare/{}%0D{}", base, to, from)
    } else if base.contains("gitlab") {
        format!("{}/-/compare/{}...{}", base, from, to)
    } else {
        format!("{}/compare/{}...{}", base, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestRepo;

    #[test]
    fn test_web_url_forms() {
        assert_eq!(
            web_url("git@github.com:acme/app.git").as_deref(),
            Some("https://github.com/acme/app")
        );
        assert_eq!(
            web_url("https://github.com/acme/app.git").as_deref(),
            Some("https://github.com/acme/app")
        );
        assert_eq!(
            web_url("https://token@gitlab.com/group/sub/app").as_deref(),
            Some("https://gitlab.com/group/sub/app")
        );
        assert_eq!(
            web_url("ssh://git@bitbucket.org/acme/app.git").as_deref(),
            Some("https://bitbucket.org/acme/app")
        );
        assert_eq!(web_url("/srv/git/app.git"), None);
    }

    #[test]
    fn test_compare_url_per_host() {
        assert_eq!(
            compare_url("https://github.com/acme/app", "v1.0.0", "v1.1.0"),
            "https://github.com/acme/app/compare/v1.0.0...v1.1.0"
        );
        assert_eq!(
            compare_url("https://gitlab.com/acme/app", "v1.0.0", "HEAD"),
            "https://gitlab.com/acme/app/-/compare/v1.0.0...HEAD"
        );
        assert_eq!(
            compare_url("https://bitbucket.org/acme/app", "v1.0.0", "v1.1.0"),
            "https://bitbucket.org/acme/app/branches/compare/v1.1.0%0Dv1.0.0"
        );
    }

    #[test]
    fn test_repo_compare_url() {
        let repo = TestRepo::new();
        repo.commit("Initial commit");
        repo.add_remote("origin", "git@github.com:acme/app.git");

        let git = repo.open();
        assert_eq!(
            git.compare_url("origin", "v1.0.0", "HEAD").unwrap(),
            "https://github.com/acme/app/compare/v1.0.0...HEAD"
        );
        assert!(matches!(
            git.compare_url("upstream", "a", "b"),
            Err(GitError::RemoteNotFound(_))
        ));
    }
}
