//! Callback bridge
//!
//! Entry points the messaging library invokes on its own threads. Each one
//! resolves the client's `EventQueues`, copies what it was given into an
//! owned event, and pushes it for the host to poll later.
//!
//! ```text
//! library thread                          host thread
//! ──────────────                          ───────────
//! log_callback ──────┐
//! error_callback ────┼──▶ EventQueues ──▶ poll(kind) ──▶ host callables
//! delivery_callback ─┘
//! ```

mod client;
mod handlers;
pub mod api;

pub use client::{ClientHandle, DeliveryReport, OpaqueRef};
pub use handlers::{delivery_callback, error_callback, log_callback};
