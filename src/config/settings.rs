//! TOML configuration file parsing and loading
//!
//! The configuration decides which event queues a client gets, how deep they
//! may grow, and how the host loop and logger behave. Every section and key is
//! optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [queues]
//! log = true
//! error = true
//! delivery = true
//! capacity = 10000
//!
//! [logging]
//! level = "info"
//! format = "text"
//!
//! [host]
//! poll_interval_ms = 10
//! max_batch = 256
//! ```

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_QUEUE_CAPACITY: usize = 10000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
const DEFAULT_MAX_BATCH: usize = 256;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: &[&str] = &["text", "ext", "json"];

/// Which event queues to attach, and their depth
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueSettings {
    pub log: bool,
    pub error: bool,
    pub delivery: bool,
    /// Maximum events waiting per queue before pushes are dropped
    pub capacity: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            log: true,
            error: true,
            delivery: true,
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
    pub file: Option<PathBuf>,
    pub color: Option<bool>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file: None,
            color: None,
        }
    }
}

/// Host polling loop behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostSettings {
    pub poll_interval_ms: u64,
    /// Upper bound on events taken from one queue per poll tick
    pub max_batch: usize,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub queues: QueueSettings,
    pub logging: LoggingSettings,
    pub host: HostSettings,
}

impl BridgeConfig {
    /// `<config dir>/kafka-bridge/kafka-bridge.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("kafka-bridge").join("kafka-bridge.toml"))
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// An explicitly given file must exist. Without one, the default path is
    /// used when present, otherwise built-in defaults apply.
    pub fn load(config_file: Option<&Path>) -> ConfigResult<Self> {
        let path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.queues.capacity == 0 {
            return Err(invalid("queues.capacity must be greater than 0"));
        }
        if self.host.poll_interval_ms == 0 {
            return Err(invalid("host.poll_interval_ms must be greater than 0"));
        }
        if self.host.max_batch == 0 {
            return Err(invalid("host.max_batch must be greater than 0"));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(&format!(
                "logging.level '{}' is not one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(invalid(&format!(
                "logging.format '{}' is not one of {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            )));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid {
        message: message.to_string(),
    }
}
