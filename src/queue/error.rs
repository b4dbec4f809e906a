//! Queue Error Types

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Queue is full (max size: {max_size})")]
    QueueFull { max_size: usize },

    #[error("Queue lock unavailable: {message}")]
    Poisoned { message: String },

    #[error("Could not allocate a queue slot")]
    AllocationFailed,
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// A push the queue refused
///
/// The rejected item travels back to the producer untouched, so the producer
/// decides how to dispose of it. Queue state is unchanged by a failed push.
pub struct PushError<T> {
    item: T,
    cause: QueueError,
}

impl<T> PushError<T> {
    pub(crate) fn new(item: T, cause: QueueError) -> Self {
        Self { item, cause }
    }

    pub fn cause(&self) -> &QueueError {
        &self.cause
    }

    /// Reclaim the item that could not be queued
    pub fn into_inner(self) -> T {
        self.item
    }

    pub fn into_parts(self) -> (T, QueueError) {
        (self.item, self.cause)
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Push rejected: {}", self.cause)
    }
}

impl<T> std::error::Error for PushError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

impl crate::core::error_handling::ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
