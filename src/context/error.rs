//! Error types for the event-queues context

use crate::queue::api::QueueError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("Event queues have already been destroyed")]
    AlreadyDestroyed,

    #[error(transparent)]
    Queue(#[from] QueueError),
}

pub type ContextResult<T> = Result<T, ContextError>;

impl crate::core::error_handling::ContextualError for ContextError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
