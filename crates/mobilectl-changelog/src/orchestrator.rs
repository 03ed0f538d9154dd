//! Changelog generation
//!
//! The orchestrator ties the engine together: it resolves which commits are
//! new, renders them as a version section, and unless it is a dry run,
//! writes the file through the safe writer and records what was included.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use mobilectl_core::config::{ChangelogConfig, Config};
use mobilectl_core::error::ChangelogError;
use mobilectl_git::GitRepo;

use crate::backup::FileBackupManager;
use crate::formatter::{ChangelogFormatter, MarkdownFormatter};
use crate::parser::{CommitParser, GitCommitParser};
use crate::state::{JsonStateManager, StateManager};
use crate::types::{BreakingChange, ChangelogEntry, ChangelogState, Commit, GenerationResult, Section};
use crate::writer::{ChangelogWriter, SafeFileWriter};

/// Version label used when nothing else names the release
pub const UNRELEASED: &str = "Unreleased";

/// Options for a single generation run
#[derive(Debug, Clone, Default)]
pub struct ChangelogOptions {
    /// Start after this tag, overriding state and config
    pub from_tag: Option<String>,
    /// Render without touching the file, backups or state
    pub dry_run: bool,
    /// Prepend (`true`) or replace (`false`); defaults to the config
    pub append: Option<bool>,
    /// Version for the section header
    pub version: Option<String>,
}

impl ChangelogOptions {
    /// Options for a dry run
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }

    /// Set the starting tag
    pub fn with_from_tag(mut self, tag: impl Into<String>) -> Self {
        self.from_tag = Some(tag.into());
        self
    }

    /// Force append or replace mode
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = Some(append);
        self
    }

    /// Set the section version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Where the commits of a run start
#[derive(Debug, Clone, PartialEq, Eq)]
enum CommitRange {
    /// After a tag (or the whole history)
    Tag(Option<String>),
    /// After a recorded commit
    SinceHash(String),
}

impl CommitRange {
    /// Reference the compare link starts from
    fn start_ref(&self) -> Option<&str> {
        match self {
            Self::Tag(tag) => tag.as_deref(),
            Self::SinceHash(hash) => Some(hash),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Tag(Some(tag)) => format!("in range {}..HEAD", tag),
            Self::Tag(None) => "in repository history".to_string(),
            Self::SinceHash(hash) => {
                format!("since {}", hash.chars().take(7).collect::<String>())
            }
        }
    }
}

/// Drives one changelog generation from commits to file
pub struct ChangelogOrchestrator {
    config: ChangelogConfig,
    root: PathBuf,
    project_version: Option<String>,
    parser: Box<dyn CommitParser>,
    writer: Box<dyn ChangelogWriter>,
    state: Box<dyn StateManager>,
    formatter: Box<dyn ChangelogFormatter>,
}

impl ChangelogOrchestrator {
    /// Create an orchestrator from its collaborators.
    ///
    /// Relative output paths are resolved against `root`.
    pub fn new(
        config: ChangelogConfig,
        root: impl Into<PathBuf>,
        parser: impl CommitParser + 'static,
        writer: impl ChangelogWriter + 'static,
        state: impl StateManager + 'static,
    ) -> Self {
        let formatter = MarkdownFormatter::from_config(&config);
        Self {
            config,
            root: root.into(),
            project_version: None,
            parser: Box::new(parser),
            writer: Box::new(writer),
            state: Box::new(state),
            formatter: Box::new(formatter),
        }
    }

    /// Orchestrator over the git repository containing `root`, storing
    /// backups and state under `<root>/.mobilectl`
    pub fn for_project(config: &Config, root: &Path) -> Result<Self, ChangelogError> {
        let repo = GitRepo::discover(root)?;
        let parser = GitCommitParser::new(repo, config.changelog.commit_types.clone());
        let writer = SafeFileWriter::new(FileBackupManager::for_project(root));
        let state = JsonStateManager::for_project(root);

        let mut orchestrator = Self::new(config.changelog.clone(), root, parser, writer, state);
        orchestrator.project_version = config.version.clone();
        Ok(orchestrator)
    }

    /// Use a custom formatter
    pub fn with_formatter<F: ChangelogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Version to use when the options do not name one
    pub fn with_project_version(mut self, version: impl Into<String>) -> Self {
        self.project_version = Some(version.into());
        self
    }

    /// Absolute path of the changelog file
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.config.output_file)
    }

    /// Run one generation. Failures are reported in the result, never raised.
    #[instrument(skip(self), fields(dry_run = options.dry_run))]
    pub fn generate(&self, options: &ChangelogOptions) -> GenerationResult {
        let mut commit_count = 0;
        match self.try_generate(options, &mut commit_count) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "changelog generation failed");
                GenerationResult {
                    output_path: Some(self.output_path()),
                    dry_run: options.dry_run,
                    ..GenerationResult::failure(e.to_string(), commit_count)
                }
            }
        }
    }

    fn try_generate(
        &self,
        options: &ChangelogOptions,
        commit_count: &mut usize,
    ) -> Result<GenerationResult, ChangelogError> {
        let range = self.resolve_range(options)?;
        let commits = match &range {
            CommitRange::Tag(tag) => self.parser.parse_commits(tag.as_deref(), None)?,
            CommitRange::SinceHash(hash) => self.parser.parse_commits_since_hash(hash)?,
        };
        *commit_count = commits.len();

        if commits.is_empty() {
            return Err(ChangelogError::NoCommits(range.describe()));
        }
        info!(commits = commits.len(), range = %range.describe(), "collected commits");

        let version = self.resolve_version(options)?;
        let entry = self.build_entry(&version, &commits, &range);
        let section = self.formatter.format(&entry);

        let output_path = self.output_path();
        let append = options.append.unwrap_or(self.config.append);
        let content = if append {
            let existing = self.writer.read(&output_path)?.unwrap_or_default();
            self.formatter.prepend(&existing, &section)
        } else {
            self.formatter.document(&section)
        };

        let result = GenerationResult {
            success: true,
            content: Some(content),
            commit_count: commits.len(),
            error: None,
            version: Some(version.clone()),
            output_path: Some(output_path.clone()),
            dry_run: options.dry_run,
        };

        if options.dry_run {
            debug!("dry run, leaving file and state untouched");
            return Ok(result);
        }

        let content = result.content.as_deref().unwrap_or_default();
        self.writer.write(content, &output_path)?;

        let state = ChangelogState {
            last_commit_hash: Some(commits[0].hash.clone()),
            last_tag: self.parser.latest_tag().unwrap_or_else(|e| {
                warn!(error = %e, "could not read latest tag for state");
                None
            }),
            last_version: Some(version),
            last_generated_at: Some(Utc::now()),
        };
        self.state.save_state(&state)?;

        info!(path = %output_path.display(), append, "changelog generated");
        Ok(result)
    }

    /// Explicit tag, then recorded state, then configured tag, then everything
    fn resolve_range(&self, options: &ChangelogOptions) -> Result<CommitRange, ChangelogError> {
        if let Some(tag) = &options.from_tag {
            return Ok(CommitRange::Tag(Some(tag.clone())));
        }

        if self.config.use_last_state {
            let state = self.state.get_state()?;
            if let Some(hash) = state.last_commit_hash {
                debug!(hash = %hash, "resuming from recorded commit");
                return Ok(CommitRange::SinceHash(hash));
            }
            if let Some(tag) = state.last_tag {
                debug!(tag = %tag, "resuming from recorded tag");
                return Ok(CommitRange::Tag(Some(tag)));
            }
        }

        Ok(CommitRange::Tag(self.config.from_tag.clone()))
    }

    /// Explicit version, then project version, then latest tag, then "Unreleased"
    fn resolve_version(&self, options: &ChangelogOptions) -> Result<String, ChangelogError> {
        if let Some(version) = options.version.as_ref().or(self.project_version.as_ref()) {
            return Ok(version.clone());
        }

        Ok(self
            .parser
            .latest_tag()?
            .map(|tag| tag.strip_prefix('v').unwrap_or(&tag).to_string())
            .unwrap_or_else(|| UNRELEASED.to_string()))
    }

    fn build_entry(&self, version: &str, commits: &[Commit], range: &CommitRange) -> ChangelogEntry {
        let mut entry = ChangelogEntry::new(version, commits[0].date);

        for commit_type in &self.config.commit_types {
            let mut section = Section::new(commit_type.heading());
            section.commits = commits
                .iter()
                .filter(|c| c.commit_type.eq_ignore_ascii_case(&commit_type.key))
                .cloned()
                .collect();
            entry.add_section(section);
        }

        entry.breaking_changes = commits
            .iter()
            .filter(|c| c.breaking)
            .map(BreakingChange::from_commit)
            .collect();

        if let Some(notes) = self.config.release_notes(version) {
            entry.highlights = notes.highlights.clone();
            entry
                .breaking_changes
                .extend(notes.breaking_changes.iter().map(BreakingChange::manual));
        }

        if self.config.include_compare_link {
            if let Some(start) = range.start_ref() {
                match self.parser.compare_url(start, "HEAD") {
                    Ok(url) => entry.compare_url = Some(url),
                    Err(e) => debug!(error = %e, "no compare link"),
                }
            }
        }

        entry
    }
}
