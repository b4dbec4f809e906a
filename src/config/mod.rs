//! Bridge configuration

mod error;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{BridgeConfig, HostSettings, LoggingSettings, QueueSettings};
