//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use dialoguer::{Confirm, Select};
use tracing::info;

use mobilectl_core::config::{Config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_YAML};

use crate::cli::Cli;

/// Create a mobilectl configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Use defaults without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yes = self.yes, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_YAML));

        if config_path.exists() && !self.force {
            if self.yes {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let format = if self.yes || self.output.is_some() {
            format_for(&config_path)
        } else {
            let formats = ["yaml", "toml"];
            let selection = Select::new()
                .with_prompt("Configuration format")
                .items(&formats)
                .default(0)
                .interact()?;
            formats[selection]
        };

        let config_path = if format == "toml" && config_path.extension().is_some_and(|e| e == "yaml") {
            config_path.with_extension("toml")
        } else {
            config_path
        };

        std::fs::write(&config_path, render(format)?)?;

        if !cli.quiet {
            println!(
                "{} Created configuration at {}",
                style("✓").green().bold(),
                style(config_path.display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to choose your commit types", config_path.display());
            println!("  2. Run {} to verify your setup", style("mobilectl validate").cyan());
            println!(
                "  3. Run {} to preview the changelog",
                style("mobilectl changelog generate --dry-run").cyan()
            );
        }

        Ok(())
    }
}

fn format_for(path: &std::path::Path) -> &'static str {
    if path.extension().is_some_and(|e| e == "toml") {
        "toml"
    } else {
        "yaml"
    }
}

/// Default configuration in the requested format
fn render(format: &str) -> anyhow::Result<String> {
    if format == "toml" {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE)?;
        Ok(toml::to_string_pretty(&config)?)
    } else {
        Ok(DEFAULT_CONFIG_TEMPLATE.to_string())
    }
}
