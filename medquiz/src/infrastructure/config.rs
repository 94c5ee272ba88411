use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_INDEX_FILE, DEFAULT_POLL_MS, DEFAULT_PORT, MODULES_DIR,
};

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "medquiz.toml";

/// TOML configuration for medquiz
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ContentConfig {
    /// Directory holding `Modules/` and the structure index
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WatcherConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct StorageConfig {
    /// Empty means `<data dir>/medquiz/storage.json`
    #[serde(default)]
    pub path: String,
}

// Default value functions
fn default_public_dir() -> PathBuf { PathBuf::from("public") }
fn default_index_file() -> String { DEFAULT_INDEX_FILE.to_string() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_debounce_ms() -> u64 { DEFAULT_DEBOUNCE_MS }
fn default_poll_ms() -> u64 { DEFAULT_POLL_MS }

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            index_file: default_index_file(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            poll_ms: default_poll_ms(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load `explicit` if given, else `medquiz.toml` from the working directory
    /// if present, else defaults. Environment overrides are applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                debug!(path = %path.display(), "Loading config");
                Self::load(path)?
            }
            None if Path::new(CONFIG_FILE_NAME).is_file() => {
                debug!("Loading {} from working directory", CONFIG_FILE_NAME);
                Self::load(CONFIG_FILE_NAME)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// `MEDQUIZ_HOST` and `MEDQUIZ_PORT` override the server section.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("MEDQUIZ_HOST").filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("MEDQUIZ_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(%port, "Ignoring invalid MEDQUIZ_PORT"),
            }
        }
    }

    pub fn modules_root(&self) -> PathBuf {
        self.content.public_dir.join(MODULES_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.content.public_dir.join(&self.content.index_file)
    }

    pub fn storage_path(&self) -> Result<PathBuf> {
        if !self.storage.path.is_empty() {
            return Ok(PathBuf::from(&self.storage.path));
        }
        let data_dir = dirs::data_dir().context("Could not find data directory")?;
        Ok(data_dir.join("medquiz").join("storage.json"))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid server address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watcher.poll_ms.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.watcher.debounce_ms)
    }
}
