//! Client configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! holds the base URLs of the two backend services and the last username
//! used to sign in.
//!
//! Configuration is stored at `~/.config/microbank/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "microbank";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default base URL for the client/identity service
const DEFAULT_CLIENT_URL: &str = "http://localhost:8081/api";

/// Default base URL for the banking/ledger service
const DEFAULT_BANKING_URL: &str = "http://localhost:8082/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub client_service_url: String,
    pub banking_service_url: String,
    pub last_username: Option<String>,
    /// Override for the session storage directory. When unset, the
    /// platform data directory is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_service_url: DEFAULT_CLIENT_URL.to_string(),
            banking_service_url: DEFAULT_BANKING_URL.to_string(),
            last_username: None,
            storage_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
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

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session file.
    pub fn session_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.storage_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
