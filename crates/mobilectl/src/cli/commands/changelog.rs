//! Changelog command

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use mobilectl_changelog::{
    BackupInfo, BackupManager, ChangelogOptions, ChangelogOrchestrator, FileBackupManager,
    JsonStateManager, StateManager,
};
use mobilectl_core::config::{load_config_or_default, validation::validate_config, Config};
use mobilectl_core::error::ChangelogError;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Changelog generation and maintenance
#[derive(Debug, Args)]
pub struct ChangelogCommand {
    #[command(subcommand)]
    pub action: ChangelogAction,
}

/// Changelog subcommands
#[derive(Debug, Subcommand)]
pub enum ChangelogAction {
    /// Render new commits into the changelog
    Generate(GenerateCommand),
    /// Inspect and restore changelog backups
    Backups(BackupsCommand),
    /// Inspect or reset the incremental generation state
    State(StateCommand),
}

impl ChangelogCommand {
    /// Execute the changelog command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.action {
            ChangelogAction::Generate(cmd) => cmd.execute(cli),
            ChangelogAction::Backups(cmd) => cmd.execute(cli),
            ChangelogAction::State(cmd) => cmd.execute(cli),
        }
    }
}

/// Loaded configuration and the directory it applies to
struct Project {
    config: Config,
    root: PathBuf,
}

impl Project {
    /// Find the configuration from the working directory upward. Paths are
    /// relative to the directory holding the config file.
    fn load() -> anyhow::Result<Self> {
        Self::load_from(&std::env::current_dir()?)
    }

    fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let (config, config_path) = load_config_or_default(dir)?;
        let root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dir.to_path_buf());
        Ok(Self { config, root })
    }

    fn output_path(&self) -> PathBuf {
        self.root.join(&self.config.changelog.output_file)
    }

    fn backups(&self) -> FileBackupManager {
        FileBackupManager::for_project(&self.root)
    }

    fn state(&self) -> JsonStateManager {
        JsonStateManager::for_project(&self.root)
    }
}

/// Ask before a destructive action unless `--yes` was given
fn confirm(prompt: String, yes: bool) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", style("Aborted.").yellow());
    }
    Ok(confirmed)
}

/// Render new commits into the changelog
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Start after this tag instead of the recorded state
    #[arg(long, value_name = "TAG")]
    pub from_tag: Option<String>,

    /// Prepend the new section to the existing file
    #[arg(long, conflicts_with = "replace")]
    pub append: bool,

    /// Replace the whole file with the new section
    #[arg(long)]
    pub replace: bool,

    /// Print the result without writing the file, backups or state
    #[arg(long)]
    pub dry_run: bool,

    /// Version for the section header
    #[arg(long = "for-version", value_name = "VERSION")]
    pub for_version: Option<String>,

    /// Generate even when the changelog is disabled in the config
    #[arg(short = 'C', long)]
    pub changelog: bool,

    /// Output file (defaults to the configured changelog file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenerateCommand {
    fn options(&self) -> ChangelogOptions {
        let append = match (self.append, self.replace) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        ChangelogOptions {
            from_tag: self.from_tag.clone(),
            dry_run: self.dry_run,
            append,
            version: self.for_version.clone(),
        }
    }

    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            from_tag = ?self.from_tag,
            dry_run = self.dry_run,
            force = self.changelog,
            "executing changelog generate command"
        );
        let mut project = Project::load()?;

        if !project.config.changelog.enabled && !self.changelog {
            if !cli.quiet {
                output::warning("Changelog generation is disabled in the configuration (use -C to force)");
            }
            return Ok(());
        }

        if let Some(output_file) = &self.output {
            project.config.changelog.output_file = output_file.clone();
        }
        validate_config(&project.config)?;

        let orchestrator = ChangelogOrchestrator::for_project(&project.config, &project.root)?;
        let result = orchestrator.generate(&self.options());

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Text if !result.success => {}
            OutputFormat::Text => {
                if result.dry_run {
                    print!("{}", result.content.as_deref().unwrap_or_default());
                } else if !cli.quiet {
                    let path = result
                        .output_path
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    output::success(&format!(
                        "Changelog for {} written to {} ({} commits)",
                        output::version_style().apply_to(result.version.as_deref().unwrap_or("?")),
                        output::path_style().apply_to(path),
                        result.commit_count
                    ));
                }
            }
        }

        if !result.success {
            let reason = result
                .error
                .unwrap_or_else(|| "no changelog content produced".to_string());
            return Err(ChangelogError::GenerationFailed(reason).into());
        }

        Ok(())
    }
}

/// Changelog backup management
#[derive(Debug, Args)]
pub struct BackupsCommand {
    #[command(subcommand)]
    pub action: BackupsAction,
}

/// Backup subcommands
#[derive(Debug, Subcommand)]
pub enum BackupsAction {
    /// List backups, newest first
    List(BackupsListCommand),
    /// Restore a backup over the changelog
    Restore(BackupsRestoreCommand),
    /// Delete a single backup
    Delete(BackupsDeleteCommand),
    /// Delete all but the newest backups
    Prune(BackupsPruneCommand),
}

impl BackupsCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.action {
            BackupsAction::List(cmd) => cmd.execute(cli),
            BackupsAction::Restore(cmd) => cmd.execute(cli),
            BackupsAction::Delete(cmd) => cmd.execute(cli),
            BackupsAction::Prune(cmd) => cmd.execute(cli),
        }
    }
}

/// List backups
#[derive(Debug, Args)]
pub struct BackupsListCommand {
    /// Include backups of every file, not only the changelog
    #[arg(long)]
    pub all: bool,
}

/// Restore a backup
#[derive(Debug, Args)]
pub struct BackupsRestoreCommand {
    /// Backup id, as shown by `backups list`
    pub id: String,

    /// File to restore into (defaults to the configured changelog file)
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Skip confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Delete a backup
#[derive(Debug, Args)]
pub struct BackupsDeleteCommand {
    /// Backup id, as shown by `backups list`
    pub id: String,

    /// Skip confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Prune old backups
#[derive(Debug, Args)]
pub struct BackupsPruneCommand {
    /// Number of backups to keep
    #[arg(long, default_value = "10")]
    pub keep: usize,

    /// Skip confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl BackupsListCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = Project::load()?;
        let manager = project.backups();
        let backups = if self.all {
            manager.list_all_backups()?
        } else {
            manager.list_backups(&project.output_path())?
        };

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&backups)?);
            return Ok(());
        }

        if cli.quiet {
            for backup in &backups {
                println!("{}", backup.id);
            }
            return Ok(());
        }

        println!("{}", output::header("Changelog Backups"));
        println!();
        println!(
            "{}",
            output::key_value(
                "Location",
                &output::path_style()
                    .apply_to(manager.backup_dir().display())
                    .to_string()
            )
        );
        println!();

        if backups.is_empty() {
            output::info("No backups found");
            return Ok(());
        }

        for backup in &backups {
            print_backup(backup);
        }
        println!();
        println!("{} backup(s)", backups.len());

        Ok(())
    }
}

fn print_backup(backup: &BackupInfo) {
    println!(
        "  {}  {}  {}",
        style(&backup.id).bold(),
        style(backup.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
        output::format_size(backup.size)
    );
}

impl BackupsRestoreCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(id = %self.id, "executing backups restore command");
        let project = Project::load()?;
        let target = match &self.target {
            Some(path) => project.root.join(path),
            None => project.output_path(),
        };

        if !confirm(
            format!("Restore backup {} over {}?", self.id, target.display()),
            self.yes,
        )? {
            return Ok(());
        }

        project.backups().restore_backup(&self.id, &target)?;

        if cli.format == OutputFormat::Json {
            let result = serde_json::json!({
                "restored": self.id,
                "target": target.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if !cli.quiet {
            output::success(&format!(
                "Restored {} to {}",
                self.id,
                output::path_style().apply_to(target.display())
            ));
        }

        Ok(())
    }
}

impl BackupsDeleteCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(id = %self.id, "executing backups delete command");
        let project = Project::load()?;

        if !confirm(format!("Delete backup {}?", self.id), self.yes)? {
            return Ok(());
        }

        project.backups().delete_backup(&self.id)?;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "deleted": self.id }))?);
        } else if !cli.quiet {
            output::success(&format!("Deleted backup {}", self.id));
        }

        Ok(())
    }
}

impl BackupsPruneCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(keep = self.keep, "executing backups prune command");
        let project = Project::load()?;
        let manager = project.backups();

        let total = manager.list_all_backups()?.len();
        let excess = total.saturating_sub(self.keep);
        if excess == 0 {
            if !cli.quiet && cli.format == OutputFormat::Text {
                output::info(&format!("Nothing to prune ({} backup(s), keeping {})", total, self.keep));
            }
            return Ok(());
        }

        if !confirm(
            format!("Delete {} of {} backup(s), keeping the newest {}?", excess, total, self.keep),
            self.yes,
        )? {
            return Ok(());
        }

        let removed = manager.delete_old_backups(self.keep)?;

        if cli.format == OutputFormat::Json {
            let result = serde_json::json!({
                "total": total,
                "removed": removed,
                "kept": total - removed,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if !cli.quiet {
            output::success(&format!("Removed {} of {} backup(s)", removed, total));
        }

        Ok(())
    }
}

/// Incremental generation state
#[derive(Debug, Args)]
pub struct StateCommand {
    #[command(subcommand)]
    pub action: StateAction,
}

/// State subcommands
#[derive(Debug, Subcommand)]
pub enum StateAction {
    /// Show what the last generation recorded
    Show,
    /// Forget the recorded state so the next run starts over
    Reset {
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

impl StateCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = Project::load()?;
        let manager = project.state();

        match &self.action {
            StateAction::Show => {
                let state = manager.get_state()?;
                if cli.format == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&state)?);
                    return Ok(());
                }
                if state.is_empty() {
                    output::info("No changelog has been generated yet");
                    return Ok(());
                }

                println!("{}", output::header("Changelog State"));
                println!();
                let none = || "-".to_string();
                println!("{}", output::key_value("File", &manager.path().display().to_string()));
                println!(
                    "{}",
                    output::key_value("Last commit", &state.last_commit_hash.clone().unwrap_or_else(none))
                );
                println!(
                    "{}",
                    output::key_value("Last tag", &state.last_tag.clone().unwrap_or_else(none))
                );
                println!(
                    "{}",
                    output::key_value("Last version", &state.last_version.clone().unwrap_or_else(none))
                );
                println!(
                    "{}",
                    output::key_value(
                        "Generated at",
                        &state
                            .last_generated_at
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(none)
                    )
                );
            }
            StateAction::Reset { yes } => {
                if !confirm(
                    format!("Reset changelog state at {}?", manager.path().display()),
                    *yes,
                )? {
                    return Ok(());
                }
                let cleared = manager.clear_state()?;
                if !cli.quiet {
                    if cleared {
                        output::success("Changelog state reset");
                    } else {
                        output::info("No changelog state to reset");
                    }
                }
            }
        }

        Ok(())
    }
}
