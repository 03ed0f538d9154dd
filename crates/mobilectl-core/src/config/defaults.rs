//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "mobilectl.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "mobilectl.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".mobilectl.yaml";

/// Tool-private directory inside a project
pub const TOOL_DIR: &str = ".mobilectl";

/// Changelog state file name inside [`TOOL_DIR`]
pub const STATE_FILE: &str = "changelog-state.json";

/// Backup directory name inside [`TOOL_DIR`]
pub const BACKUP_DIR: &str = "changelog-backups";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".mobilectl.toml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# mobilectl configuration

changelog:
  enabled: true
  format: markdown
  output_file: CHANGELOG.md
  append: true
  use_last_state: true
  include_hashes: true
  include_authors: true
  commit_types:
    - type: feat
      label: Features
      emoji: "✨"
    - type: fix
      label: Bug Fixes
      emoji: "🐛"
    - type: perf
      label: Performance
      emoji: "⚡"
    - type: docs
      label: Documentation
      emoji: "📚"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses() {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.changelog.commit_types.len(), 4);
        assert_eq!(config.changelog.format, "markdown");
    }

    #[test]
    fn test_default_yaml_round_trips() {
        let yaml = default_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.changelog.enabled);
    }
}
