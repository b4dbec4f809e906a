//! Thread-Safe Event Queue Component
//!
//! A mutex-protected FIFO that carries owned values from the messaging
//! library's internal threads to the single host thread.
//!
//! # Overview
//!
//! - **Many producers**: any library thread may push at any time
//! - **One consumer**: the host polls; it never blocks unless it asks to via
//!   a timeout-bounded `pop_timeout`
//! - **Ownership transfer**: a pushed value belongs to the queue until it is
//!   popped or drained; a refused push hands the value back
//! - **Per-queue FIFO**: push order is preserved whichever thread pushed
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  ┌────────────┐  ┌────────────┐
//! │ lib thread │  │ lib thread │  │ lib thread │
//! └─────┬──────┘  └─────┬──────┘  └─────┬──────┘
//!       │ push          │ push          │ push
//!       ▼               ▼               ▼
//! ┌──────────────────────────────────────────────┐
//! │ EventQueue<T>   Mutex<VecDeque<T>>           │
//! │  ┌───┬───┬───┬───┬───┬───┐                   │
//! │  │ 1 │ 2 │ 3 │ 4 │ 5 │...│                   │
//! │  └───┴───┴───┴───┴───┴───┘                   │
//! └──────────────────────┬───────────────────────┘
//!                        │ pop (non-blocking)
//!                 ┌──────┴──────┐
//!                 │ host thread │
//!                 └─────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use kafka_bridge::queue::api::EventQueue;
//!
//! let queue = EventQueue::with_capacity("log", 1024);
//! queue.push("connected".to_string()).unwrap();
//!
//! while let Some(line) = queue.pop().unwrap() {
//!     println!("{}", line);
//! }
//! ```

mod error;
mod event_queue;

pub mod api;

pub use error::{PushError, QueueError, QueueResult};
pub use event_queue::{EventQueue, QueueStats};

#[cfg(test)]
mod tests;
