use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::modules::DEFAULT_TIME_FORMAT;
use crate::template::DEFAULT_FORMAT;

/// Directory holding the per-project config, relative to the working dir.
pub const CONFIG_DIR: &str = ".bulkrename";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultsConfig {
    /// Format template used when `--format` is not given
    #[serde(default = "default_format")]
    pub format: String,

    /// Module selected when `--module` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Default preview format: "lines", "table", "summary" or "none"
    #[serde(default = "default_preview")]
    pub preview: String,

    #[serde(default)]
    pub allow_overwrite: bool,

    /// Whether to use color output by default (None = auto-detect)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_color: Option<bool>,

    /// strftime format for the stat module's timestamps
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            module: None,
            preview: default_preview(),
            allow_overwrite: false,
            use_color: None,
            time_format: default_time_format(),
        }
    }
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_preview() -> String {
    "lines".to_string()
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

impl Config {
    /// Load config from .bulkrename/config.toml if it exists
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(CONFIG_DIR).join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific path. Unlike [`Config::load`], a missing
    /// file is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let config: Self = toml::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.format, "{name}{ext}");
        assert_eq!(config.defaults.module, None);
        assert_eq!(config.defaults.preview, "lines");
        assert!(!config.defaults.allow_overwrite);
        assert_eq!(config.defaults.use_color, None);
        assert_eq!(config.defaults.time_format, "%Y-%m-%d_%H-%M-%S");
    }

    #[test]
    fn test_load_written_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.format = "{number}{ext}".to_string();
        config.defaults.module = Some("number".to_string());
        config.defaults.preview = "table".to_string();
        config.defaults.use_color = Some(false);

        fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded_config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded_config, config);
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[defaults]
module = "hash"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.defaults.module.as_deref(), Some("hash"));
        assert_eq!(config.defaults.format, "{name}{ext}");
        assert_eq!(config.defaults.preview, "lines");
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[defaults\nformat = ").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFile { path, .. } if path == config_path));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load_from_path(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFile { .. }));
    }

    #[test]
    #[serial]
    fn test_load_from_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp_dir.path()).unwrap();

        let missing = Config::load();

        fs::create_dir_all(temp_dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_DIR).join("config.toml"),
            "[defaults]\nallow_overwrite = true\n",
        )
        .unwrap();
        let loaded = Config::load();

        std::env::set_current_dir(original_dir).unwrap();

        assert_eq!(missing.unwrap(), Config::default());
        assert!(loaded.unwrap().defaults.allow_overwrite);
    }
}
