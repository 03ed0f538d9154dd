//! CLI commands

mod changelog;
mod completions;
mod init;
mod validate;

pub use changelog::ChangelogCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use validate::ValidateCommand;
