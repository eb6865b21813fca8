//! Application configuration.
//!
//! Settings are resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional JSON file (`--config FILE`, or `config.json` in the data directory)
//! 3. Environment variables, after `.env` has been loaded by the binary
//!
//! | Variable | Field |
//! | --- | --- |
//! | `API_KEY` | `server.api_key` |
//! | `SESSION_SECRET` | `server.session_secret` |
//! | `SIMPLETASK_HOST` / `SIMPLETASK_PORT` | `server.host` / `server.port` |
//! | `DB_PATH` | `db_path` |
//! | `OPENAI_API_KEY` | `openai.api_key` |
//! | `OPENAI_BASE_URL` / `OPENAI_MODEL` / `OPENAI_TIMEOUT_SECS` | `openai.*` |
//!
//! Empty variables count as unset, so `API_KEY=` leaves the API locked.
//!
//! ```rust,no_run
//! use simpletask::libs::config::Config;
//!
//! let config = Config::read(None)?;
//! println!("database: {}", config.db_path()?.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::db::db::DB_FILE_NAME;
use crate::libs::messages::Message;
use crate::msg_error_anyhow;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Secret every `/api/*` caller must present in `X-API-Key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Key for signing identity cookies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    pub openai: OpenAiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_key: None,
            session_secret: None,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 20,
        }
    }
}

impl OpenAiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Loads the configuration from `path` (or the data-directory file when it
    /// exists) and applies environment overrides.
    pub fn read(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_overrides(|key| env::var(key).ok());

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_json::from_str(&config_str).map_err(|e| msg_error_anyhow!(Message::ConfigParseError(e.to_string())))?;
        tracing::debug!("{}", Message::ConfigLoaded(path.display().to_string()));

        Ok(config)
    }

    /// Overrides fields from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("API_KEY") {
            self.server.api_key = Some(value);
        }
        if let Some(value) = get("SESSION_SECRET") {
            self.server.session_secret = Some(value);
        }
        if let Some(value) = get("SIMPLETASK_HOST") {
            self.server.host = value;
        }
        if let Some(port) = get("SIMPLETASK_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(value) = get("DB_PATH") {
            self.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(value);
        }
        if let Some(value) = get("OPENAI_BASE_URL") {
            self.openai.base_url = value;
        }
        if let Some(value) = get("OPENAI_MODEL") {
            self.openai.model = value;
        }
        if let Some(secs) = get("OPENAI_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.openai.timeout_secs = secs;
        }
    }

    /// Database file, defaulting to `simpletask.db` in the data directory.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => DataStorage::new().get_path(DB_FILE_NAME),
        }
    }

    /// Key used to sign identity cookies.
    ///
    /// Falls back to a digest of the API key when no session secret is set.
    pub fn session_key(&self) -> Option<Vec<u8>> {
        match (&self.server.session_secret, &self.server.api_key) {
            (Some(secret), _) => Some(secret.as_bytes().to_vec()),
            (None, Some(api_key)) => {
                let mut hasher = Sha256::new();
                hasher.update(b"simpletask-session:");
                hasher.update(api_key.as_bytes());
                Some(hasher.finalize().to_vec())
            }
            (None, None) => None,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
