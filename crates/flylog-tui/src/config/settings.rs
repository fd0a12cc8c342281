//! Settings parser for the flylog config file

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const CONFIG_DIR: &str = "flylog";
const CONFIG_FILENAME: &str = "config.toml";

/// Errors raised while loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings (`~/.config/flylog/config.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log server host
    pub host: String,

    /// Log server port
    pub port: u16,

    /// Period between SUB heartbeats
    pub heartbeat_interval_ms: u64,

    /// Silence after which the server counts as lost
    pub stale_after_ms: u64,

    /// Quiet period before a filter edit is evaluated
    pub debounce_ms: u64,

    /// Records per bulk batch when reading a file
    pub batch_size: usize,

    /// Longest accepted line in a file
    pub max_line_bytes: usize,

    /// Label that precedes the correlation key in a message
    pub correlation_marker: String,

    /// Follow the tail when new rows arrive
    pub auto_scroll: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9090,
            heartbeat_interval_ms: 500,
            stale_after_ms: 1000,
            debounce_ms: 750,
            batch_size: 100,
            max_line_bytes: 1024 * 1024,
            correlation_marker: "call-id:".to_string(),
            auto_scroll: false,
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one the per-user config file is
    /// used when present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                other => {
                    tracing::debug!(path = ?other, "no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// `host:port` of the log server
    pub fn server_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            // Bare IPv6 literal
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Per-user config file location
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}
