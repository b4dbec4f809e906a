//! Event-queues context
//!
//! The aggregate handed to the messaging library as a client's opaque
//! context: three optional queues, two host callback slots, and the
//! lifecycle rules for tearing them down.
//!
//! ```text
//! Uninitialized ──activate()──▶ Active ──destroy()──▶ Destroyed
//!   (attach queues,               (library callbacks     (queues drained,
//!    register callbacks)           push; host polls)      callbacks released)
//! ```

mod error;
mod event_queues;
mod host;

pub use error::{ContextError, ContextResult};
pub use event_queues::{ContextState, EventQueues, TeardownReport};
pub use host::{HostRef, HostRegistry};
