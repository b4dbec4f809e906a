//! Event envelopes carried from library threads to the host
//!
//! Three payload shapes share one `Event` sum type so a single generic queue
//! implementation serves all of them.

mod codes;
mod types;

pub use codes::{ErrorCode, LogLevel};
pub use types::{DeliveryEvent, ErrorEvent, Event, EventKind, LogEvent};
