//! The single-threaded host side of the bridge
//!
//! Polls each event queue in turn on a fixed interval and dispatches what it
//! finds: library log lines go back out through the `log` facade, error and
//! delivery events go to the host callables registered for them.

use crate::app::registry::CallbackTable;
use crate::config::HostSettings;
use crate::context::{ContextResult, EventQueues, HostRef, TeardownReport};
use crate::events::{Event, EventKind, LogEvent};
use crate::queue::api::QueueStats;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

/// What the host did with drained events
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchTally {
    pub polls: usize,
    pub logs: usize,
    pub errors: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Delivery events whose callback slot had no callable
    pub unclaimed: usize,
}

/// Final state after the context has been torn down
#[derive(Debug, Clone, Serialize)]
pub struct HostOutcome {
    pub dispatch: DispatchTally,
    pub teardown: TeardownReport,
    pub log_queue: Option<QueueStats>,
    pub error_queue: Option<QueueStats>,
    pub delivery_queue: Option<QueueStats>,
}

/// Re-emit a library log line through the process logger
///
/// Facilities become the target suffix: `library::BROKER`.
pub fn forward_library_log(event: &LogEvent) {
    let level = event
        .severity()
        .map_or(log::Level::Info, |severity| severity.as_log_level());
    let target = format!("library::{}", event.facility());
    log::log!(target: &target, level, "{}", event.message());
}

pub struct HostLoop {
    context: Arc<EventQueues>,
    callables: CallbackTable,
    max_batch: usize,
    poll_interval: Duration,
    tally: DispatchTally,
}

impl HostLoop {
    pub fn new(context: Arc<EventQueues>, callables: CallbackTable, settings: &HostSettings) -> Self {
        Self {
            context,
            callables,
            max_batch: settings.max_batch,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            tally: DispatchTally::default(),
        }
    }

    pub fn context(&self) -> &Arc<EventQueues> {
        &self.context
    }

    pub fn callables(&self) -> &CallbackTable {
        &self.callables
    }

    pub fn tally(&self) -> DispatchTally {
        self.tally
    }

    /// Drain up to `max_batch` events from each queue
    ///
    /// Returns how many events were dispatched.
    pub fn poll_once(&mut self) -> ContextResult<usize> {
        let mut dispatched = 0;
        for kind in EventKind::iter() {
            for _ in 0..self.max_batch {
                match self.context.poll(kind)? {
                    Some(event) => {
                        self.dispatch(event);
                        dispatched += 1;
                    }
                    None => break,
                }
            }
        }
        self.tally.polls += 1;
        Ok(dispatched)
    }

    fn dispatch(&mut self, event: Event) {
        match &event {
            Event::Log(log_event) => {
                self.tally.logs += 1;
                forward_library_log(log_event);
                if let Some(reference) = self.context.log_callback() {
                    self.callables.invoke(reference, &event);
                }
            }
            Event::Error(error_event) => {
                self.tally.errors += 1;
                log::warn!(
                    "Library error {}: {}",
                    error_event.code(),
                    error_event.reason()
                );
                if let Some(reference) = self.context.error_callback() {
                    self.callables.invoke(reference, &event);
                }
            }
            Event::Delivery(delivery) => {
                if delivery.is_delivered() {
                    self.tally.delivered += 1;
                } else {
                    self.tally.failed += 1;
                }
                let reference = HostRef::new(delivery.callback_id());
                if !self.callables.invoke(reference, &event) {
                    self.tally.unclaimed += 1;
                    log::debug!("No host callable for delivery report {}", reference);
                }
            }
        }
    }

    /// Poll until shutdown is signalled, or until the library reports idle
    /// and a poll comes back empty
    pub async fn run<F>(
        &mut self,
        shutdown: &mut broadcast::Receiver<()>,
        library_idle: F,
    ) -> ContextResult<()>
    where
        F: Fn() -> bool,
    {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::info!("Host loop interrupted");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    // sampled before polling so events pushed just before idle are not missed
                    let idle = library_idle();
                    let dispatched = self.poll_once()?;
                    log::trace!("Poll dispatched {} event(s)", dispatched);
                    if idle && dispatched == 0 {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Drain what is left, then destroy the context
    ///
    /// The library must already be stopped. If draining fails the context is
    /// still destroyed; whatever could not be dispatched is dropped there.
    pub fn finish(mut self) -> ContextResult<(HostOutcome, CallbackTable)> {
        loop {
            match self.poll_once() {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    log::warn!("Final drain stopped early: {}", err);
                    break;
                }
            }
        }
        let teardown = self.context.destroy(&mut self.callables)?;
        let outcome = HostOutcome {
            dispatch: self.tally,
            teardown,
            log_queue: self.context.queue_stats(EventKind::Log),
            error_queue: self.context.queue_stats(EventKind::Error),
            delivery_queue: self.context.queue_stats(EventKind::Delivery),
        };
        Ok((outcome, self.callables))
    }
}
