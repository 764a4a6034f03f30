/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed CLI configuration
[POS]:    Configuration layer - backend endpoint, storage location, timeouts
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use ijazah_adapter::http::DEFAULT_BASE_URL;
use ijazah_adapter::{AuthConfig, ClientConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the ijazah CLI; every field has a default
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CliConfig {
    /// Backend API root, including the `/api` prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Directory holding the persisted session slots
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Session window in seconds
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            storage_dir: None,
            timeout_secs: default_timeout_secs(),
            session_timeout_secs: default_session_timeout_secs(),
        }
    }
}

impl CliConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// An empty document yields the defaults
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("parse config yaml")
    }

    /// Configured directory, or `<data dir>/ijazah`
    pub fn resolved_storage_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| anyhow!("Could not determine data directory"))?
                .join("ijazah")),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..ClientConfig::default()
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::default().with_session_timeout(Duration::from_secs(self.session_timeout_secs))
    }
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_session_timeout_secs() -> u64 {
    30 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::from_yaml("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.api_base_url, "http://localhost:8000/api");
        assert_eq!(config.client_config().timeout, Duration::from_secs(120));
        assert_eq!(config.auth_config().session_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn test_partial_config() {
        let config = CliConfig::from_yaml(
            "api_base_url: https://ijazah.example.ac.id/api\nstorage_dir: /tmp/ijazah-session\n",
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://ijazah.example.ac.id/api");
        assert_eq!(
            config.resolved_storage_dir().unwrap(),
            PathBuf::from("/tmp/ijazah-session")
        );
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("ijazah-cli-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "timeout_secs: 30\nsession_timeout_secs: 60\n").unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
        assert_eq!(config.auth_config().session_timeout, Duration::from_secs(60));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(CliConfig::from_yaml("timeout_secs: soon").is_err());
        assert!(CliConfig::from_file(Path::new("/nonexistent/ijazah.yaml")).is_err());
    }
}
