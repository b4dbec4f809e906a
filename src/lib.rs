//! Thread-safe bridge from messaging-library callbacks to a single-threaded host
//!
//! Library threads call the handlers in [`callbacks`]; each one copies its
//! arguments into an owned event and pushes it onto the client's
//! [`context::EventQueues`]. The host drains those queues on its own thread
//! and dispatches to its own callables.

pub mod app;
pub mod callbacks;
pub mod config;
pub mod context;
pub mod core;
pub mod events;
pub mod queue;
