//! Markdown changelog formatter

use mobilectl_core::config::ChangelogConfig;
use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::types::{BreakingChange, ChangelogEntry, Commit};

/// Top-level title of a changelog document
pub const CHANGELOG_HEADER: &str = "# Changelog";

/// Heading of the breaking changes subsection
const BREAKING_HEADING: &str = "### ⚠ BREAKING CHANGES";

/// Markdown changelog formatter
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    /// Append the short hash to every entry
    pub include_hashes: bool,
    /// Append the author to every entry
    pub include_authors: bool,
}

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self {
            include_hashes: true,
            include_authors: true,
        }
    }

    /// Formatter honoring the entry options of a changelog config
    pub fn from_config(config: &ChangelogConfig) -> Self {
        Self {
            include_hashes: config.include_hashes,
            include_authors: config.include_authors,
        }
    }

    fn commit_line(&self, commit: &Commit) -> String {
        let mut line = String::from("- ");
        if let Some(scope) = &commit.scope {
            line.push_str(&format!("**{}:** ", scope));
        }
        line.push_str(&commit.message);

        if self.include_hashes && !commit.short_hash.is_empty() {
            line.push_str(&format!(" ({})", commit.short_hash));
        }
        if self.include_authors {
            if let Some(author) = &commit.author {
                line.push_str(&format!(" - {}", author));
            }
        }
        line
    }

    fn breaking_line(change: &BreakingChange) -> String {
        let mut line = String::from("- ");
        if let Some(scope) = &change.scope {
            line.push_str(&format!("**{}:** ", scope));
        }
        line.push_str(&change.description);
        if let Some(note) = &change.note {
            line.push_str(&format!("\n  {}", note));
        }
        line
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip(self, entry), fields(version = %entry.version, section_count = entry.sections.len()))]
    fn format(&self, entry: &ChangelogEntry) -> String {
        let mut blocks = Vec::new();

        blocks.push(format!(
            "## [{}] - {}",
            entry.version,
            entry.date.format("%Y-%m-%d")
        ));

        if let Some(url) = &entry.compare_url {
            blocks.push(format!("[Compare changes]({})", url));
        }

        if let Some(highlights) = entry.highlights.as_deref().map(str::trim) {
            if !highlights.is_empty() {
                blocks.push(highlights.to_string());
            }
        }

        for section in entry.sections.iter().filter(|s| !s.is_empty()) {
            let lines: Vec<String> = section.commits.iter().map(|c| self.commit_line(c)).collect();
            blocks.push(format!("### {}\n\n{}", section.heading, lines.join("\n")));
        }

        if !entry.breaking_changes.is_empty() {
            let lines: Vec<String> = entry
                .breaking_changes
                .iter()
                .map(Self::breaking_line)
                .collect();
            blocks.push(format!("{}\n\n{}", BREAKING_HEADING, lines.join("\n")));
        }

        let mut output = blocks.join("\n\n");
        output.push('\n');

        debug!(output_len = output.len(), "markdown section formatted");
        output
    }

    fn document(&self, section: &str) -> String {
        format!("{}\n\n{}", CHANGELOG_HEADER, section)
    }

    fn prepend(&self, existing: &str, section: &str) -> String {
        if existing.trim().is_empty() {
            return self.document(section);
        }
        let section = section.trim_end();

        if !has_title(existing) {
            return format!(
                "{}\n\n{}\n\n{}",
                CHANGELOG_HEADER,
                section,
                existing.trim_start_matches(['\n', '\r'])
            );
        }

        match first_version_offset(existing) {
            Some(offset) => format!(
                "{}\n\n{}\n\n{}",
                existing[..offset].trim_end(),
                section,
                &existing[offset..]
            ),
            None => format!("{}\n\n{}\n", existing.trim_end(), section),
        }
    }
}

/// Whether the first non-blank line is a level one heading
fn has_title(text: &str) -> bool {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.starts_with("# "))
}

/// Byte offset of the first `## ` line
fn first_version_offset(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with("## ") {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Section;
    use chrono::{TimeZone, Utc};

    fn commit(scope: Option<&str>, message: &str, author: &str) -> Commit {
        Commit {
            hash: "abc1234567890".to_string(),
            short_hash: "abc1234".to_string(),
            commit_type: "feat".to_string(),
            scope: scope.map(str::to_string),
            message: message.to_string(),
            body: None,
            author: Some(author.to_string()),
            date: Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap(),
            breaking: false,
            breaking_note: None,
        }
    }

    fn entry() -> ChangelogEntry {
        let mut entry = ChangelogEntry::new("1.0.0", Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap());
        let mut section = Section::new("✨ Features");
        section.commits.push(commit(Some("auth"), "add login", "Ahmed"));
        section.commits.push(commit(None, "add logout", "Jane"));
        entry.add_section(section);
        entry
    }

    #[test]
    fn test_format_basic() {
        let output = MarkdownFormatter::new().format(&entry());

        assert_eq!(
            output,
            "## [1.0.0] - 2026-05-01\n\n\
             ### ✨ Features\n\n\
             - **auth:** add login (abc1234) - Ahmed\n\
             - add logout (abc1234) - Jane\n"
        );
    }

    #[test]
    fn test_format_without_hashes_or_authors() {
        let mut config = ChangelogConfig::default();
        config.include_hashes = false;
        config.include_authors = false;

        let output = MarkdownFormatter::from_config(&config).format(&entry());
        assert!(output.contains("- **auth:** add login\n"));
        assert!(!output.contains("abc1234"));
        assert!(!output.contains("Ahmed"));
    }

    #[test]
    fn test_format_highlights_and_compare_link() {
        let mut entry = entry();
        entry.highlights = Some("  First public release.\n".to_string());
        entry.compare_url = Some("https://github.com/acme/app/compare/v0.9.0...HEAD".to_string());

        let output = MarkdownFormatter::new().format(&entry);
        let header = output.find("## [1.0.0]").unwrap();
        let link = output.find("[Compare changes](").unwrap();
        let highlights = output.find("First public release.").unwrap();
        let features = output.find("### ✨ Features").unwrap();
        assert!(header < link && link < highlights && highlights < features);
    }

    #[test]
    fn test_format_breaking_changes_last() {
        let mut entry = entry();
        entry.breaking_changes.push(BreakingChange {
            description: "drop v1 endpoints".to_string(),
            scope: Some("api".to_string()),
            note: Some("clients must migrate to /v2".to_string()),
        });
        entry
            .breaking_changes
            .push(BreakingChange::manual("Minimum iOS version is 15"));

        let output = MarkdownFormatter::new().format(&entry);
        assert!(output.ends_with(
            "### ⚠ BREAKING CHANGES\n\n\
             - **api:** drop v1 endpoints\n  clients must migrate to /v2\n\
             - Minimum iOS version is 15\n"
        ));
    }

    #[test]
    fn test_document_has_single_header() {
        let formatter = MarkdownFormatter::new();
        let doc = formatter.document(&formatter.format(&entry()));
        assert!(doc.starts_with("# Changelog\n\n## [1.0.0]"));
        assert_eq!(doc.matches("# Changelog").count(), 1);
    }

    #[test]
    fn test_prepend_to_empty_file() {
        let formatter = MarkdownFormatter::new();
        let section = formatter.format(&entry());
        assert_eq!(formatter.prepend("", &section), formatter.document(&section));
        assert_eq!(formatter.prepend("\n  \n", &section), formatter.document(&section));
    }

    #[test]
    fn test_prepend_keeps_title_and_preamble() {
        let formatter = MarkdownFormatter::new();
        let existing = "# Changelog\n\nAll notable changes are listed here.\n\n## [0.9.0] - 2026-01-01\n\n- hand edited *entry*\n";
        let merged = formatter.prepend(existing, "## [1.0.0] - 2026-05-01\n\n- new\n");

        assert_eq!(
            merged,
            "# Changelog\n\nAll notable changes are listed here.\n\n\
             ## [1.0.0] - 2026-05-01\n\n- new\n\n\
             ## [0.9.0] - 2026-01-01\n\n- hand edited *entry*\n"
        );
    }

    #[test]
    fn test_prepend_to_title_only() {
        let formatter = MarkdownFormatter::new();
        let merged = formatter.prepend("# Release history\n", "## [1.0.0] - 2026-05-01\n");
        assert_eq!(merged, "# Release history\n\n## [1.0.0] - 2026-05-01\n");
    }

    #[test]
    fn test_prepend_without_title() {
        let formatter = MarkdownFormatter::new();
        let merged = formatter.prepend("Some notes\n", "## [1.0.0] - 2026-05-01\n");
        assert_eq!(
            merged,
            "# Changelog\n\n## [1.0.0] - 2026-05-01\n\nSome notes\n"
        );
    }

    #[test]
    fn test_first_version_offset() {
        assert_eq!(first_version_offset("# T\n\n## [1]\n"), Some(5));
        assert_eq!(first_version_offset("# T\n### not a version\n"), None);
    }
}
