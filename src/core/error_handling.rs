//! Error reporting shared by the bridge's error types
//!
//! Decides how much of an error reaches the user: configuration mistakes are
//! shown as-is, internal failures get the operation context with the detail
//! kept at debug level.

/// Errors that know whether the user can act on them
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True for errors the user can fix directly, such as a bad config value
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with detail matched to who can fix it
///
/// # Examples
/// ```rust,no_run
/// # use kafka_bridge::core::error_handling::log_error_with_context;
/// # use kafka_bridge::config::ConfigError;
/// let err = ConfigError::Invalid {
///     message: "queues.capacity must be greater than 0".to_string(),
/// };
/// log_error_with_context(&err, "Loading configuration");
/// // Logs: "FATAL: queues.capacity must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::context::ContextError;
    use crate::queue::api::QueueError;

    #[test]
    fn test_invalid_config_is_user_actionable() {
        let error = ConfigError::Invalid {
            message: "host.max_batch must be greater than 0".to_string(),
        };

        assert!(error.is_user_actionable());
        assert_eq!(
            error.user_message(),
            Some("host.max_batch must be greater than 0")
        );
    }

    #[test]
    fn test_missing_config_file_is_not_actionable() {
        let error = ConfigError::NotFound {
            path: "/nowhere/kafka-bridge.toml".into(),
        };

        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
    }

    #[test]
    fn test_runtime_errors_use_generic_context() {
        let queue_error = QueueError::Poisoned {
            message: "lock poisoned".to_string(),
        };
        let context_error = ContextError::AlreadyDestroyed;

        assert!(!queue_error.is_user_actionable());
        assert!(!context_error.is_user_actionable());
        assert_eq!(context_error.user_message(), None);

        // Must not panic for either category
        log_error_with_context(&queue_error, "Polling error queue");
        log_error_with_context(&context_error, "Destroying context");
    }
}
