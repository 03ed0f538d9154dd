//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, MobilectlError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// The first matching file name wins at each level; parents are walked
/// until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration, using defaults only when no config file exists.
///
/// A config file that fails to parse or validate is an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match load_config_from_dir(dir) {
        Ok((config, path)) => Ok((config, Some(path))),
        Err(MobilectlError::Config(ConfigError::NotFound(_))) => {
            warn!(dir = %dir.display(), "no config file found, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mobilectl.yaml");
        std::fs::write(&config_path, "changelog:\n  enabled: true\n").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mobilectl.toml");
        std::fs::write(&config_path, "[changelog]\nenabled = true\n").unwrap();
        let nested = temp.path().join("app").join("src");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mobilectl.yaml");
        std::fs::write(
            &config_path,
            "version: 2.3.0\nchangelog:\n  outputFile: CHANGES.md\n  append: false\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.version.as_deref(), Some("2.3.0"));
        assert_eq!(config.changelog.output_file, PathBuf::from("CHANGES.md"));
        assert!(!config.changelog.append);
        // untouched fields keep their defaults
        assert!(config.changelog.use_last_state);
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mobilectl.toml");
        std::fs::write(
            &config_path,
            "[changelog]\nfrom_tag = \"v1.0.0\"\n\n[[changelog.commit_types]]\ntype = \"fix\"\nlabel = \"Fixes\"\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.changelog.from_tag.as_deref(), Some("v1.0.0"));
        assert_eq!(config.changelog.commit_types.len(), 1);
        assert_eq!(config.changelog.commit_types[0].emoji, "");
    }

    #[test]
    fn test_load_config_rejects_invalid_format() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mobilectl.yaml");
        std::fs::write(&config_path, "changelog:\n  format: html\n").unwrap();

        assert!(load_config(&config_path).is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert!(config.changelog.enabled);
    }

    #[test]
    fn test_load_or_default_keeps_found_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mobilectl.yaml");
        std::fs::write(&config_path, "changelog:\n  outputFile: docs/CHANGES.md\n").unwrap();

        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert_eq!(path, Some(config_path));
        assert_eq!(config.changelog.output_file, PathBuf::from("docs/CHANGES.md"));
    }

    #[test]
    fn test_load_or_default_rejects_invalid_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("mobilectl.yaml"),
            "changelog:\n  format: html\n  outputFile: docs/CHANGES.md\n",
        )
        .unwrap();

        let err = load_config_or_default(temp.path()).unwrap_err();
        assert!(matches!(err, MobilectlError::Config(_)));
    }

    #[test]
    fn test_load_or_default_rejects_malformed_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("mobilectl.yaml"), "changelog: [unclosed\n").unwrap();

        let err = load_config_or_default(temp.path()).unwrap_err();
        assert!(matches!(err, MobilectlError::Config(ConfigError::YamlError(_))));
    }
}
