//! Event envelopes produced by library callbacks and consumed by the host
//!
//! Strings handed to a callback are only valid until the callback returns, so
//! every envelope holds its own copy. Copies are made with fallible
//! reservation: when memory is exhausted the constructor returns `None` and
//! the event is dropped instead of aborting the library thread.

use crate::events::codes::{ErrorCode, LogLevel};
use serde::Serialize;
use strum_macros::EnumIter;

/// Copy a borrowed string into owned storage, or `None` if it cannot be allocated
pub(crate) fn copy_borrowed(source: &str) -> Option<String> {
    let mut owned = String::new();
    owned.try_reserve_exact(source.len()).ok()?;
    owned.push_str(source);
    Some(owned)
}

/// A log line emitted by the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    level: i32,
    facility: String,
    message: String,
}

impl LogEvent {
    pub fn try_new(level: i32, facility: &str, message: &str) -> Option<Self> {
        Some(Self {
            level,
            facility: copy_borrowed(facility)?,
            message: copy_borrowed(message)?,
        })
    }

    /// Raw syslog severity as reported
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Severity, if the reported level is a valid syslog value
    pub fn severity(&self) -> Option<LogLevel> {
        LogLevel::from_syslog(self.level)
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A client or broker error the library reported outside any single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    code: ErrorCode,
    reason: String,
}

impl ErrorEvent {
    pub fn try_new(code: ErrorCode, reason: &str) -> Option<Self> {
        Some(Self {
            code,
            reason: copy_borrowed(reason)?,
        })
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Outcome of producing one message
///
/// Created by the sender before the message is handed to the library and
/// carried through it as the message's opaque token. Deliberately neither
/// `Clone` nor `Copy`: there is exactly one per outbound message.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DeliveryEvent {
    callback_id: i32,
    code: ErrorCode,
}

impl DeliveryEvent {
    /// New token for the host callback `callback_id`, assuming success
    pub fn new(callback_id: i32) -> Self {
        Self {
            callback_id,
            code: ErrorCode::NO_ERROR,
        }
    }

    pub fn callback_id(&self) -> i32 {
        self.callback_id
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn is_delivered(&self) -> bool {
        !self.code.is_error()
    }

    /// Store a failure reported by the library. Success codes are ignored.
    pub(crate) fn record_failure(&mut self, code: ErrorCode) {
        if code.is_error() {
            self.code = code;
        }
    }
}

/// Which queue an event travels on
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Log,
    Error,
    Delivery,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Error => "error",
            Self::Delivery => "delivery",
        }
    }
}

/// Any event the host can drain
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Event {
    Log(LogEvent),
    Error(ErrorEvent),
    Delivery(DeliveryEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Log(_) => EventKind::Log,
            Self::Error(_) => EventKind::Error,
            Self::Delivery(_) => EventKind::Delivery,
        }
    }
}

impl From<LogEvent> for Event {
    fn from(event: LogEvent) -> Self {
        Self::Log(event)
    }
}

impl From<ErrorEvent> for Event {
    fn from(event: ErrorEvent) -> Self {
        Self::Error(event)
    }
}

impl From<DeliveryEvent> for Event {
    fn from(event: DeliveryEvent) -> Self {
        Self::Delivery(event)
    }
}
