//! Validate command

use clap::Args;
use console::style;
use tracing::info;

use mobilectl_core::config::{
    load_config_from_dir,
    validation::{validate, Severity, ValidationIssue},
};
use mobilectl_core::error::ConfigError;
use mobilectl_git::GitRepo;

use crate::cli::{Cli, OutputFormat};

/// Validate configuration and repository state
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Only validate the configuration file
    #[arg(long)]
    pub config_only: bool,

    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            config_only = self.config_only,
            strict = self.strict,
            "executing validate command"
        );
        let cwd = std::env::current_dir()?;

        let mut issues: Vec<ValidationIssue> = Vec::new();

        let (config, config_path) = match load_config_from_dir(&cwd) {
            Ok((c, p)) => (Some(c), Some(p)),
            Err(e) => {
                issues.push(issue("config", e.to_string(), Severity::Error));
                (None, None)
            }
        };

        if let Some(ref cfg) = config {
            issues.extend(validate(cfg));
        }

        if !self.config_only {
            match GitRepo::discover(&cwd) {
                Ok(repo) => {
                    if let Some(tag) = config.as_ref().and_then(|c| c.changelog.from_tag.as_ref()) {
                        match repo.find_tag(tag) {
                            Ok(Some(_)) => {}
                            Ok(None) => issues.push(issue(
                                "changelog.from_tag",
                                format!("tag '{}' does not exist in the repository", tag),
                                Severity::Warning,
                            )),
                            Err(e) => issues.push(issue("git", e.to_string(), Severity::Error)),
                        }
                    }
                }
                Err(e) => issues.push(issue("git", e.to_string(), Severity::Error)),
            }
        }

        // If strict, promote warnings to errors
        if self.strict {
            for issue in &mut issues {
                issue.severity = Severity::Error;
            }
        }

        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .iter()
            .partition(|i| i.severity == Severity::Error);
        let passed = errors.is_empty();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "valid": passed,
                    "config_path": config_path.map(|p| p.to_string_lossy().to_string()),
                    "issues": issues,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", style("Validation Results").bold());
                    println!();

                    if let Some(path) = config_path {
                        println!("Config: {}", style(path.display()).cyan());
                        println!();
                    }

                    if !errors.is_empty() {
                        println!("{}", style("Errors:").red().bold());
                        for error in &errors {
                            println!("  {} {}: {}", style("✗").red(), error.field, error.message);
                        }
                        println!();
                    }

                    if !warnings.is_empty() {
                        println!("{}", style("Warnings:").yellow().bold());
                        for warning in &warnings {
                            println!("  {} {}: {}", style("!").yellow(), warning.field, warning.message);
                        }
                        println!();
                    }

                    if passed && warnings.is_empty() {
                        println!("{}", style("✓ All checks passed").green().bold());
                    } else if passed {
                        println!(
                            "{} with {} warning(s)",
                            style("✓ Validation passed").green().bold(),
                            warnings.len()
                        );
                    }
                }
            }
        }

        if !passed {
            return Err(ConfigError::ValidationFailed(errors.len()).into());
        }

        Ok(())
    }
}

fn issue(field: &str, message: String, severity: Severity) -> ValidationIssue {
    ValidationIssue {
        field: field.to_string(),
        message,
        severity,
    }
}
