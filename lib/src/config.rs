use crate::error::{BmtreeError, Result};
use crate::repository::DeletePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name given to the root folder when a store is initialised
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Policy applied when deleting a folder that still has child folders
    #[serde(default)]
    pub delete_policy: DeletePolicy,

    /// How long a write waits on a locked store before failing
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Indent exported JSON
    #[serde(default = "default_pretty_export")]
    pub pretty_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
            delete_policy: DeletePolicy::default(),
            connect_timeout_ms: default_connect_timeout_ms(),
            pretty_export: default_pretty_export(),
        }
    }
}

fn default_root_name() -> String {
    "roots".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    500
}

fn default_pretty_export() -> bool {
    true
}

impl Config {
    /// Default config file location (~/.config/bmtree/config.yml)
    pub fn default_path() -> PathBuf {
        crate::utils::get_config_dir().join("config.yml")
    }

    /// Load configuration from a file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        if crate::utils::clean_name(&config.root_name).is_none() {
            return Err(BmtreeError::Config(format!(
                "root_name in {} must not be empty",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Load configuration from the default location.
    /// Falls back to default config if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = Self::default_path();

        if config_path.exists() {
            match Self::load_from_path(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to load config from {:?}: {}", config_path, e);
                    eprintln!("Warning: using default configuration ({})", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.root_name, "roots");
        assert_eq!(config.delete_policy, DeletePolicy::Block);
        assert_eq!(config.connect_timeout_ms, 500);
        assert!(config.pretty_export);
    }

    #[test]
    fn test_load_full_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_path = temp_file.path();

        fs::write(
            config_path,
            "root_name: Bookmarks\ndelete_policy: cascade\nconnect_timeout_ms: 50\npretty_export: false\n",
        )
        .unwrap();
        let loaded = Config::load_from_path(config_path).unwrap();

        assert_eq!(loaded.root_name, "Bookmarks");
        assert_eq!(loaded.delete_policy, DeletePolicy::Cascade);
        assert_eq!(loaded.connect_timeout_ms, 50);
        assert!(!loaded.pretty_export);
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_path = temp_file.path();

        fs::write(config_path, "invalid: yaml: content:").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result, Err(BmtreeError::Yaml(_))));
    }

    #[test]
    fn test_load_partial_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_path = temp_file.path();

        fs::write(config_path, "delete_policy: cascade\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.delete_policy, DeletePolicy::Cascade);
        assert_eq!(config.root_name, default_root_name());
    }

    #[test]
    fn test_load_rejects_blank_root_name() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_path = temp_file.path();

        fs::write(config_path, "root_name: '  '\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result, Err(BmtreeError::Config(_))));
    }
}
