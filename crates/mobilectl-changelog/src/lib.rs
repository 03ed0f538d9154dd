//! mobilectl Changelog - Changelog generation and safe file mutation
//!
//! This crate turns a range of conventional commits into a Markdown
//! changelog section and writes it without ever losing the previous file:
//! every overwrite is preceded by a backup, and the last processed commit is
//! recorded so the next run only renders what is new.

pub mod backup;
pub mod formatter;
pub mod orchestrator;
pub mod parser;
pub mod state;
pub mod types;
pub mod writer;

pub use backup::{BackupManager, FileBackupManager};
pub use formatter::{ChangelogFormatter, MarkdownFormatter};
pub use orchestrator::{ChangelogOptions, ChangelogOrchestrator};
pub use parser::{parse_commit_message, CommitParser, ConventionalParser, GitCommitParser};
pub use state::{JsonStateManager, StateManager};
pub use types::{BackupInfo, ChangelogEntry, ChangelogState, Commit, GenerationResult, Section};
pub use writer::{ChangelogWriter, SafeFileWriter};
