//! Command-line arguments
//!
//! Flags override values from the configuration file; anything left unset
//! keeps the file's value or its default.

use crate::config::BridgeConfig;
use crate::core::version::version_line;
use crate::events::EventKind;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "kafka-bridge")]
#[command(about = "Run a simulated client through the callback event bridge")]
#[command(version = version_line())]
#[command(after_help = " * can be specified multiple times")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Color output control: unspecified means auto-detect from the terminal
    #[arg(short = 'g', long = "color", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub color: Option<bool>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Number of simulated library threads
    #[arg(short = 't', long = "threads", value_name = "COUNT", default_value_t = 4)]
    pub threads: usize,

    /// Messages produced by each library thread
    #[arg(short = 'm', long = "messages", value_name = "COUNT", default_value_t = 250)]
    pub messages: usize,

    /// Percentage of messages whose delivery fails
    #[arg(long = "failure-rate", value_name = "PERCENT", default_value_t = 10,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    pub failure_rate: u8,

    /// Maximum events waiting per queue
    #[arg(long = "capacity", value_name = "COUNT")]
    pub capacity: Option<usize>,

    /// Event queue to leave disabled*
    #[arg(long = "disable", value_name = "KIND", action = ArgAction::Append,
          value_parser = ["log", "error", "delivery"])]
    pub disable: Vec<String>,

    /// Host poll interval in milliseconds
    #[arg(long = "poll-interval", value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Print the run summary as JSON
    #[arg(long = "json")]
    pub json: bool,
}

impl Args {
    /// Apply command-line overrides on top of loaded configuration
    pub fn apply_to(&self, config: &mut BridgeConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        if self.color.is_some() {
            config.logging.color = self.color;
        }
        if let Some(capacity) = self.capacity {
            config.queues.capacity = capacity;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.host.poll_interval_ms = interval;
        }
        for kind in self.disabled_kinds() {
            match kind {
                EventKind::Log => config.queues.log = false,
                EventKind::Error => config.queues.error = false,
                EventKind::Delivery => config.queues.delivery = false,
            }
        }
    }

    pub fn disabled_kinds(&self) -> Vec<EventKind> {
        self.disable
            .iter()
            .filter_map(|name| match name.as_str() {
                "log" => Some(EventKind::Log),
                "error" => Some(EventKind::Error),
                "delivery" => Some(EventKind::Delivery),
                _ => None,
            })
            .collect()
    }

    /// Colour for terminal output, auto-detected when not forced either way
    pub fn use_color(&self) -> bool {
        self.color
            .unwrap_or_else(|| std::io::IsTerminal::is_terminal(&std::io::stdout()))
    }
}
