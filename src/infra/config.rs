// src/infra/config.rs - Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::VoxoverError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sessions: SessionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for per-chat working files. Defaults to the
    /// platform data dir when unset.
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Sessions idle longer than this are reaped together with their
    /// working directories.
    pub ttl_minutes: u64,
    pub reap_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 60,
            reap_interval_secs: 300,
        }
    }
}

impl Config {
    /// Load from the default config file path. A missing file yields
    /// the defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&paths::config_file_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)
            .map_err(|e| VoxoverError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Where per-chat working directories live.
    pub fn media_base_dir(&self) -> PathBuf {
        self.storage
            .base_dir
            .clone()
            .unwrap_or_else(paths::media_dir)
    }
}

/// Credentials for the two external APIs, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub bot_token: String,
    pub eleven_api_key: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self, VoxoverError> {
        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| VoxoverError::Config("BOT_TOKEN is not set".into()))?;
        let eleven_api_key = std::env::var("ELEVEN_API_KEY")
            .map_err(|_| VoxoverError::Config("ELEVEN_API_KEY is not set".into()))?;
        Ok(Self {
            bot_token,
            eleven_api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert!(config.storage.base_dir.is_none());
        assert_eq!(config.sessions.ttl_minutes, 60);
        assert_eq!(config.sessions.reap_interval_secs, 300);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind = "127.0.0.1"
            port = 9090

            [storage]
            base_dir = "/tmp/voxover-media"

            [sessions]
            ttl_minutes = 15
            reap_interval_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.storage.base_dir,
            Some(PathBuf::from("/tmp/voxover-media"))
        );
        assert_eq!(config.sessions.ttl_minutes, 15);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sessions.ttl_minutes, 60);
    }

    #[test]
    fn test_load_from_missing_file_is_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/voxover.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_media_base_dir_prefers_configured() {
        let mut config = Config::default();
        config.storage.base_dir = Some(PathBuf::from("/srv/media"));
        assert_eq!(config.media_base_dir(), PathBuf::from("/srv/media"));
    }
}
