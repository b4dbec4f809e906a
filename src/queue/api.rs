//! Public API for the queue system
//!
//! External modules should import from here rather than directly from internal modules.

// Core queue
pub use crate::queue::event_queue::{EventQueue, QueueStats};

// Error handling
pub use crate::queue::error::{PushError, QueueError, QueueResult};
