//! Numeric codes carried by events: library error codes and syslog severities

use serde::Serialize;
use std::fmt;
use strum_macros::EnumIter;

/// Error code reported by the messaging library
///
/// Negative values are client-internal errors, positive values come from the
/// broker, and zero means success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(i32);

impl ErrorCode {
    pub const NO_ERROR: ErrorCode = ErrorCode(0);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_error(self) -> bool {
        self.0 != 0
    }

    /// Raised inside the client rather than returned by a broker
    pub const fn is_local(self) -> bool {
        self.0 < 0
    }

    /// Symbolic name for the codes hosts most commonly branch on
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            -199 => "_BAD_MSG",
            -198 => "_BAD_COMPRESSION",
            -197 => "_DESTROY",
            -196 => "_FAIL",
            -195 => "_TRANSPORT",
            -194 => "_CRIT_SYS_RESOURCE",
            -193 => "_RESOLVE",
            -192 => "_MSG_TIMED_OUT",
            -191 => "_PARTITION_EOF",
            -190 => "_UNKNOWN_PARTITION",
            -188 => "_UNKNOWN_TOPIC",
            -187 => "_ALL_BROKERS_DOWN",
            -186 => "_INVALID_ARG",
            -185 => "_TIMED_OUT",
            -184 => "_QUEUE_FULL",
            0 => "NO_ERROR",
            1 => "OFFSET_OUT_OF_RANGE",
            2 => "INVALID_MSG",
            3 => "UNKNOWN_TOPIC_OR_PART",
            5 => "LEADER_NOT_AVAILABLE",
            6 => "NOT_LEADER_FOR_PARTITION",
            7 => "REQUEST_TIMED_OUT",
            10 => "MSG_SIZE_TOO_LARGE",
            _ => return None,
        };
        Some(name)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Syslog severity used by the library's log callback
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    pub fn from_syslog(level: i32) -> Option<Self> {
        match level {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Emergency => "emerg",
            Self::Alert => "alert",
            Self::Critical => "crit",
            Self::Error => "err",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Level used when re-emitting the line through the `log` facade
    pub fn as_log_level(&self) -> log::Level {
        match self {
            Self::Emergency | Self::Alert | Self::Critical | Self::Error => log::Level::Error,
            Self::Warning => log::Level::Warn,
            Self::Notice | Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_code_defaults_to_success() {
        let code = ErrorCode::default();
        assert_eq!(code, ErrorCode::NO_ERROR);
        assert!(!code.is_error());
    }

    #[test]
    fn test_error_code_classification() {
        assert!(ErrorCode::new(7).is_error());
        assert!(!ErrorCode::new(7).is_local());
        assert!(ErrorCode::new(-192).is_local());
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::new(7).to_string(), "REQUEST_TIMED_OUT (7)");
        assert_eq!(ErrorCode::new(-195).to_string(), "_TRANSPORT (-195)");
        assert_eq!(ErrorCode::new(4242).to_string(), "4242");
    }

    #[test]
    fn test_log_level_round_trips_through_syslog_value() {
        for level in LogLevel::iter() {
            assert_eq!(LogLevel::from_syslog(level as i32), Some(level));
        }
        assert_eq!(LogLevel::from_syslog(8), None);
        assert_eq!(LogLevel::from_syslog(-1), None);
    }

    #[test]
    fn test_log_level_maps_to_log_facade() {
        assert_eq!(LogLevel::Critical.as_log_level(), log::Level::Error);
        assert_eq!(LogLevel::Warning.as_log_level(), log::Level::Warn);
        assert_eq!(LogLevel::Notice.as_log_level(), log::Level::Info);
        assert_eq!(LogLevel::Debug.as_log_level(), log::Level::Debug);
    }
}
