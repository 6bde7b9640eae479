//! Configuration management for yester.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (`GEMINI_API_KEY`, `YESTER_CONFIG`)
//! 2. Config file (`<data dir>/config.toml`)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use yester_core::client::DEFAULT_BASE_URL;
use yester_core::ContentConfig;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const CONFIG_ENV: &str = "YESTER_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Content pipeline settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Gemini API key; `GEMINI_API_KEY` takes precedence
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Local cache and selection files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Shared cache database; defaults to `<data_dir>/shared-cache.db`
    pub remote_db: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("ai", "yester", "yester") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".yester")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            remote_db: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load a config file, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config
            .content
            .validate()
            .context("Invalid [content] section in config file")?;

        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var(API_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.api.gemini_api_key = Some(key);
        }
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    /// Usable API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Directory holding the persisted local cache and last selection
    pub fn cache_dir(&self) -> PathBuf {
        self.paths.data_dir.join("cache")
    }

    pub fn remote_db_path(&self) -> PathBuf {
        self.paths
            .remote_db
            .clone()
            .unwrap_or_else(|| self.paths.data_dir.join("shared-cache.db"))
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.data_dir)
            .context("Failed to create data directory")?;
        std::fs::create_dir_all(self.cache_dir()).context("Failed to create cache directory")?;
        if let Some(parent) = self.remote_db_path().parent() {
            std::fs::create_dir_all(parent).context("Failed to create shared cache directory")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.content.generator.max_events, 3);
        assert_eq!(config.content.resolution.debounce_ms, 300);
        assert!(config.api_key().is_none());
        assert_eq!(
            config.remote_db_path(),
            config.paths.data_dir.join("shared-cache.db")
        );
    }

    #[test]
    fn test_load_partial_file() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
gemini_api_key = "from-file"

[content.generator]
max_events = 5

[content.resolution]
debounce_ms = 150

[paths]
data_dir = "/tmp/yester-test"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_key(), Some("from-file"));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.content.generator.max_events, 5);
        assert_eq!(config.content.generator.text_model, "gemini-2.5-flash");
        assert_eq!(config.content.resolution.debounce_ms, 150);
        assert_eq!(config.content.resolution.min_skeleton_ms, 400);
        assert_eq!(
            config.remote_db_path(),
            PathBuf::from("/tmp/yester-test/shared-cache.db")
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&temp.path().join("nope.toml")).unwrap();
        assert_eq!(config.content, ContentConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_content() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[content.generator]\nmax_events = 9\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_key_overrides_file() {
        let mut config = Config::default();
        config.api.gemini_api_key = Some("from-file".into());

        config.apply_env(|name| (name == API_KEY_ENV).then(|| "from-env".to_string()));
        assert_eq!(config.api_key(), Some("from-env"));

        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.api_key(), Some("from-env"));

        config.api.gemini_api_key = Some(" ".into());
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_ensure_dirs_creates_directories() {
        let temp = tempdir().expect("Failed to create temp dir");
        let config = Config {
            paths: PathsConfig {
                data_dir: temp.path().join("data"),
                remote_db: Some(temp.path().join("shared").join("cache.db")),
            },
            ..Config::default()
        };

        assert!(!config.paths.data_dir.exists());

        config.ensure_dirs().expect("Failed to create directories");

        assert!(config.paths.data_dir.exists());
        assert!(config.cache_dir().exists());
        assert!(temp.path().join("shared").exists());
    }
}
