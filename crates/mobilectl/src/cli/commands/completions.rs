//! Shell completions

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::{output, Cli};

/// Binary name completions are registered for
const BIN_NAME: &str = "mobilectl";

/// Print a completion script for a shell
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "executing completions command");

        match &self.output {
            Some(path) => {
                let mut file = std::fs::File::create(path)?;
                write_completions(self.shell, &mut file);
                file.flush()?;
                if !cli.quiet {
                    output::success(&format!(
                        "Completions written to {}",
                        output::path_style().apply_to(path.display())
                    ));
                }
            }
            None => write_completions(self.shell, &mut std::io::stdout()),
        }

        Ok(())
    }
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}
