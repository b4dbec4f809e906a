//! Public API for the callback bridge
//!
//! External modules should import from here rather than directly from internal modules.

// Context resolution
pub use crate::callbacks::client::{ClientHandle, DeliveryReport, OpaqueRef};

// Library entry points
pub use crate::callbacks::handlers::{delivery_callback, error_callback, log_callback};
