//! Stand-in for the messaging library's internal threads
//!
//! Each thread produces a run of messages and fires the same callbacks a
//! real client would: a debug log line per message, a delivery report per
//! message, and a transport error now and then. Outcomes are derived from the
//! message number so a run is reproducible.

use crate::callbacks::api::{
    delivery_callback, error_callback, log_callback, ClientHandle, DeliveryReport, OpaqueRef,
};
use crate::context::EventQueues;
use crate::events::{DeliveryEvent, ErrorCode, LogLevel};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Every Nth message is produced without a delivery token
const FIRE_AND_FORGET_EVERY: usize = 10;
/// Each thread raises a transport error every N messages
const ERROR_EVERY: usize = 100;

const MSG_TIMED_OUT: i32 = -192;
const TRANSPORT: i32 = -195;

/// One simulated client, as the library thread sees it
#[derive(Debug, Clone)]
pub struct SimulatedClient {
    name: String,
    opaque: OpaqueRef,
}

impl SimulatedClient {
    pub fn new(name: impl Into<String>, opaque: OpaqueRef) -> Self {
        Self {
            name: name.into(),
            opaque,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ClientHandle for SimulatedClient {
    fn opaque(&self) -> Option<Arc<EventQueues>> {
        self.opaque.upgrade()
    }
}

/// What the library side did, summed over all threads
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProducerTally {
    pub produced: usize,
    pub with_token: usize,
    pub failed_reports: usize,
    pub errors_raised: usize,
    pub logs_emitted: usize,
}

impl ProducerTally {
    fn merge(&mut self, other: &ProducerTally) {
        self.produced += other.produced;
        self.with_token += other.with_token;
        self.failed_reports += other.failed_reports;
        self.errors_raised += other.errors_raised;
        self.logs_emitted += other.logs_emitted;
    }
}

#[derive(Debug, Clone)]
pub struct LibrarySimulator {
    pub threads: usize,
    pub messages_per_thread: usize,
    /// Percentage of messages whose delivery fails, 0 to 100
    pub failure_rate: u8,
    /// Host slot carried by delivery tokens; `None` produces without tokens
    pub delivery_callback_id: Option<i32>,
}

impl LibrarySimulator {
    /// Start the library threads
    ///
    /// Threads stop early once `stop` is set.
    pub fn spawn(
        &self,
        client: SimulatedClient,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<LibraryThreads> {
        let mut handles = Vec::with_capacity(self.threads);
        for thread_index in 0..self.threads {
            let worker = Worker {
                thread_index,
                config: self.clone(),
                client: client.clone(),
                stop: Arc::clone(&stop),
            };
            let handle = thread::Builder::new()
                .name(format!("{}-lib-{}", client.name(), thread_index))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }
        log::debug!("Started {} library thread(s)", handles.len());
        Ok(LibraryThreads { handles })
    }

    fn fails(&self, message_id: usize) -> bool {
        (message_id * 37 + 11) % 100 < usize::from(self.failure_rate)
    }
}

struct Worker {
    thread_index: usize,
    config: LibrarySimulator,
    client: SimulatedClient,
    stop: Arc<AtomicBool>,
}

impl Worker {
    fn run(self) -> ProducerTally {
        let mut tally = ProducerTally::default();
        let base = self.thread_index * self.config.messages_per_thread;

        for sequence in 0..self.config.messages_per_thread {
            if self.stop.load(Ordering::Acquire) {
                log::debug!("Library thread {} stopping early", self.thread_index);
                break;
            }
            let message_id = base + sequence;

            log_callback(
                &self.client,
                LogLevel::Debug as i32,
                "PRODUCE",
                &format!("Produced message {} on {}", message_id, self.client.name()),
            );
            tally.logs_emitted += 1;

            if sequence > 0 && sequence % ERROR_EVERY == 0 {
                error_callback(
                    &self.client,
                    TRANSPORT,
                    &format!("{}: broker connection reset", self.client.name()),
                    &self.client.opaque,
                );
                tally.errors_raised += 1;
            }

            let token = match self.config.delivery_callback_id {
                Some(id) if message_id % FIRE_AND_FORGET_EVERY != FIRE_AND_FORGET_EVERY - 1 => {
                    Some(DeliveryEvent::new(id))
                }
                _ => None,
            };
            let failed = self.config.fails(message_id);
            if token.is_some() {
                tally.with_token += 1;
                if failed {
                    tally.failed_reports += 1;
                }
            }
            let code = if failed {
                ErrorCode::new(MSG_TIMED_OUT)
            } else {
                ErrorCode::NO_ERROR
            };
            delivery_callback(
                &self.client,
                DeliveryReport::new(code, token),
                &self.client.opaque,
            );
            tally.produced += 1;

            if sequence % 64 == 63 {
                thread::yield_now();
            }
        }
        tally
    }
}

/// Handles to running library threads
#[derive(Debug)]
pub struct LibraryThreads {
    handles: Vec<JoinHandle<ProducerTally>>,
}

impl LibraryThreads {
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    /// Wait for every thread and sum their tallies
    ///
    /// A thread that panicked contributes nothing and is logged.
    pub fn join(self) -> ProducerTally {
        let mut total = ProducerTally::default();
        for handle in self.handles {
            match handle.join() {
                Ok(tally) => total.merge(&tally),
                Err(_) => log::error!("Library thread panicked"),
            }
        }
        total
    }
}
