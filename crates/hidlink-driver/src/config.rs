//! TOML configuration for a driver session.
//!
//! Example:
//!
//! ```toml
//! [device]
//! address = "192.168.2.188"
//! port = 16896
//! identity = "3E4A9C21"
//!
//! [monitor]
//! enabled = true
//! port = 5002
//! idle_timeout_ms = 3
//!
//! [driver]
//! command_timeout_ms = 2000
//! log_level = "info"
//! ```
//!
//! Fields absent from the file fall back to their `#[serde(default)]`
//! helpers, so a partial file (or none at all) still produces a usable
//! template config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeviceConfig {
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub driver: DriverSection,
}

/// Where the appliance lives and who it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSection {
    /// IP address of the appliance on the LAN.
    #[serde(default = "default_address")]
    pub address: String,
    /// UDP command port shown on the appliance display.
    #[serde(default = "default_command_port")]
    pub port: u16,
    /// 8-hex-digit device identity shown on the appliance display.
    #[serde(default = "default_identity")]
    pub identity: String,
}

/// Hardware report stream settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSection {
    /// Whether to request the report stream at session start.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local UDP port the appliance streams reports to.
    #[serde(default = "default_monitor_port")]
    pub port: u16,
    /// Silence window after which motion is considered stopped.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

/// Command-path behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverSection {
    /// How long one command waits for its reply.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_address() -> String {
    "192.168.2.188".to_string()
}
fn default_command_port() -> u16 {
    16896
}
fn default_identity() -> String {
    "00000000".to_string()
}
fn default_true() -> bool {
    true
}
fn default_monitor_port() -> u16 {
    5002
}
fn default_idle_timeout_ms() -> u64 {
    3
}
fn default_command_timeout_ms() -> u64 {
    2000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_command_port(),
            identity: default_identity(),
        }
    }
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            port: default_monitor_port(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            command_timeout_ms: default_command_timeout_ms(),
            log_level: default_log_level(),
        }
    }
}

// ── Load / save ───────────────────────────────────────────────────────────────

impl DeviceConfig {
    /// Loads a config from `path`, returning `DeviceConfig::default()` if the
    /// file does not yet exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than "not
    /// found", and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: DeviceConfig = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DeviceConfig::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Persists the config to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system failures or
    /// [`ConfigError::Serialize`] if serialization fails.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
