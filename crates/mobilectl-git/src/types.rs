//! Commit and tag records read from a repository

use chrono::{DateTime, TimeZone, Utc};
use semver::Version;

/// A commit as stored in history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full object id
    pub hash: String,
    /// Raw commit message, subject and body
    pub message: String,
    /// Author name, when the signature carries one
    pub author: Option<String>,
    /// Commit time
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// First seven characters of the hash
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Everything after the subject, or `None` when blank
    pub fn body(&self) -> Option<&str> {
        self.message
            .split_once('\n')
            .map(|(_, rest)| rest.trim())
            .filter(|rest| !rest.is_empty())
    }
}

impl From<&git2::Commit<'_>> for CommitInfo {
    fn from(commit: &git2::Commit<'_>) -> Self {
        Self {
            hash: commit.id().to_string(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author: commit
                .author()
                .name()
                .map(str::to_string)
                .filter(|name| !name.is_empty()),
            timestamp: to_utc(commit.time().seconds()),
        }
    }
}

/// A tag with the version it names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Short tag name, without `refs/tags/`
    pub name: String,
    /// Semantic version encoded in the name
    pub version: Option<Version>,
    /// Tagger time for annotated tags, commit time otherwise
    pub date: DateTime<Utc>,
}

impl TagInfo {
    pub(crate) fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        let name = name.into();
        let version = version_from_tag(&name);
        Self { name, version, date }
    }
}

/// Version named by a tag: `v1.2.0`, `1.2.0`, `app@1.2.0` or `android-v1.2.0`
pub(crate) fn version_from_tag(tag: &str) -> Option<Version> {
    let candidate = match (tag.rsplit_once('@'), tag.rsplit_once("-v")) {
        (Some((_, rest)), _) => rest,
        (None, Some((_, rest))) => rest,
        (None, None) => tag,
    };
    let candidate = candidate.strip_prefix('v').unwrap_or(candidate);
    Version::parse(candidate).ok()
}

pub(crate) fn to_utc(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
