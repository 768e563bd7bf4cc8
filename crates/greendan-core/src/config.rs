//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! account server URL, the store listing used for the version check, and
//! where the session token is kept.
//!
//! Configuration is stored at `~/.config/greendan/config.json`. Values can
//! be overridden with `GREENDAN_*` environment variables.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{FileBackend, KeyringBackend, MemoryBackend, SessionTokenStore};
use crate::version::Platform;

/// Application name used for config/data directory paths
const APP_NAME: &str = "greendan";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:8000/accounts/dj-rest-auth";
const DEFAULT_STORE_ID: &str = "com.greendan.app";
const DEFAULT_COUNTRY: &str = "us";

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackendKind {
    Keyring,
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth_base_url: String,
    pub platform: Platform,
    /// Package name (Play Store) or bundle id (App Store)
    pub store_id: String,
    /// App Store storefront country
    pub country: String,
    pub token_backend: TokenBackendKind,
    /// Overrides the platform data directory for the file token backend
    pub data_dir: Option<PathBuf>,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            platform: Platform::current(),
            store_id: DEFAULT_STORE_ID.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            token_backend: TokenBackendKind::default(),
            data_dir: None,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from `GREENDAN_*` variables as returned by `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GREENDAN_AUTH_URL") {
            self.auth_base_url = url;
        }
        if let Some(platform) = lookup("GREENDAN_PLATFORM") {
            match Platform::parse(&platform) {
                Some(p) => self.platform = p,
                None => warn!(value = %platform, "Ignoring unknown GREENDAN_PLATFORM"),
            }
        }
        if let Some(store_id) = lookup("GREENDAN_STORE_ID") {
            self.store_id = store_id;
        }
        if let Some(backend) = lookup("GREENDAN_TOKEN_BACKEND") {
            match serde_json::from_value(serde_json::Value::String(backend.to_lowercase())) {
                Ok(kind) => self.token_backend = kind,
                Err(_) => warn!(value = %backend, "Ignoring unknown GREENDAN_TOKEN_BACKEND"),
            }
        }
        if let Some(dir) = lookup("GREENDAN_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the file token backend
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Build the token store selected by `token_backend`
    pub fn token_store(&self) -> Result<SessionTokenStore> {
        Ok(match self.token_backend {
            TokenBackendKind::Keyring => SessionTokenStore::new(KeyringBackend::new()),
            TokenBackendKind::File => SessionTokenStore::new(FileBackend::new(self.data_dir()?)),
            TokenBackendKind::Memory => SessionTokenStore::new(MemoryBackend::default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.auth_base_url, DEFAULT_AUTH_BASE_URL);
        assert_eq!(config.token_backend, TokenBackendKind::File);
        assert_eq!(config.store_id, DEFAULT_STORE_ID);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"platform":"ios","token_backend":"file"}"#).unwrap();
        assert_eq!(config.platform, Platform::Ios);
        assert_eq!(config.token_backend, TokenBackendKind::File);
        assert_eq!(config.country, DEFAULT_COUNTRY);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "GREENDAN_AUTH_URL" => Some("https://auth.example.com".to_string()),
            "GREENDAN_PLATFORM" => Some("ios".to_string()),
            "GREENDAN_TOKEN_BACKEND" => Some("Memory".to_string()),
            "GREENDAN_DATA_DIR" => Some("/tmp/greendan-data".to_string()),
            _ => None,
        });
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/greendan-data"));
        assert_eq!(config.auth_base_url, "https://auth.example.com");
        assert_eq!(config.platform, Platform::Ios);
        assert_eq!(config.token_backend, TokenBackendKind::Memory);
        assert_eq!(config.store_id, DEFAULT_STORE_ID);
    }

    #[test]
    fn test_unknown_env_values_are_ignored() {
        let mut config = Config::default();
        let before = config.clone();
        config.apply_env(|key| match key {
            "GREENDAN_PLATFORM" => Some("symbian".to_string()),
            "GREENDAN_TOKEN_BACKEND" => Some("floppy".to_string()),
            _ => None,
        });
        assert_eq!(config, before);
    }

    #[test]
    fn test_memory_token_store() {
        let config = Config {
            token_backend: TokenBackendKind::Memory,
            ..Config::default()
        };
        let store = config.token_store().unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_default_token_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let store = config.token_store().unwrap();
        assert_eq!(store.backend_name(), "file");
        store.save("abc123").unwrap();
        drop(store);

        let reopened = config.token_store().unwrap();
        assert_eq!(reopened.load().unwrap().as_deref(), Some("abc123"));
    }
}
