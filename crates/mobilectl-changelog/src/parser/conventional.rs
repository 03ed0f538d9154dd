//! Conventional Commits parser
//!
//! Parses commits following the Conventional Commits specification:
//! https://www.conventionalcommits.org/

use regex::Regex;
use std::sync::LazyLock;

use mobilectl_core::config::CommitTypeConfig;
use mobilectl_git::CommitInfo;

use crate::types::Commit;

/// Regex for parsing conventional commit subjects
static CONVENTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[\w.-]+)\))?(?P<breaking>!)?:\s*(?P<description>.+)$")
        .expect("Invalid regex")
});

/// Regex for the breaking change footer
static BREAKING_FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^BREAKING[ -]CHANGE:\s*(?P<note>.*)$").expect("Invalid regex")
});

/// Fields derived from a commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Commit type, using the configured spelling when it matches one
    pub commit_type: String,
    /// Scope
    pub scope: Option<String>,
    /// Description, verbatim
    pub description: String,
    /// Body after the subject line
    pub body: Option<String>,
    /// Breaking via `!` marker or footer
    pub breaking: bool,
    /// Footer text explaining the breaking change
    pub breaking_note: Option<String>,
}

/// Parse a full commit message (subject, blank line, body).
///
/// Returns `None` when the subject does not follow `type(scope): message`.
pub fn parse_commit_message(
    message: &str,
    commit_types: &[CommitTypeConfig],
) -> Option<ParsedMessage> {
    let message = message.trim_start();
    let (subject, body) = match message.split_once('\n') {
        Some((subject, rest)) => (subject.trim_end(), Some(rest.trim())),
        None => (message.trim_end(), None),
    };
    let body = body.filter(|b| !b.is_empty());

    let caps = CONVENTIONAL_REGEX.captures(subject)?;

    let raw_type = caps.name("type")?.as_str();
    let commit_type = commit_types
        .iter()
        .find(|t| t.key.eq_ignore_ascii_case(raw_type))
        .map(|t| t.key.clone())
        .unwrap_or_else(|| raw_type.to_lowercase());

    let description = caps.name("description")?.as_str().trim();
    if description.is_empty() {
        return None;
    }

    let breaking_note = body.and_then(breaking_footer);

    Some(ParsedMessage {
        commit_type,
        scope: caps.name("scope").map(|m| m.as_str().to_string()),
        description: description.to_string(),
        body: body.map(str::to_string),
        breaking: caps.name("breaking").is_some() || breaking_note.is_some(),
        breaking_note: breaking_note.filter(|n| !n.is_empty()),
    })
}

/// Find the breaking change footer and collect its text, including
/// continuation lines up to the next blank line.
fn breaking_footer(body: &str) -> Option<String> {
    let mut lines = body.lines();

    while let Some(line) = lines.next() {
        if let Some(caps) = BREAKING_FOOTER_REGEX.captures(line.trim_end()) {
            let mut note = caps["note"].trim().to_string();
            for next in lines.by_ref() {
                if next.trim().is_empty() {
                    break;
                }
                if !note.is_empty() {
                    note.push(' ');
                }
                note.push_str(next.trim());
            }
            return Some(note);
        }
    }

    None
}

/// Parser for Conventional Commits format
#[derive(Debug, Clone, Default)]
pub struct ConventionalParser {
    commit_types: Vec<CommitTypeConfig>,
}

impl ConventionalParser {
    /// Create a parser that normalizes types against the configured list
    pub fn new(commit_types: Vec<CommitTypeConfig>) -> Self {
        Self { commit_types }
    }

    /// Parse a git commit into a structured commit
    pub fn parse(&self, commit: &CommitInfo) -> Option<Commit> {
        let parsed = parse_commit_message(&commit.message, &self.commit_types)?;

        Some(Commit {
            hash: commit.hash.clone(),
            short_hash: commit.short_hash().to_string(),
            commit_type: parsed.commit_type,
            scope: parsed.scope,
            message: parsed.description,
            body: parsed.body,
            author: commit.author.clone(),
            date: commit.timestamp,
            breaking: parsed.breaking,
            breaking_note: parsed.breaking_note,
        })
    }
}
