//! The per-client aggregate of event queues and host callback handles
//!
//! One `EventQueues` exists per client. The client wrapper owns it through the
//! only strong `Arc`; the messaging library sees it through a `Weak` stored as
//! the client's opaque context and passed to callback registration.

use crate::config::QueueSettings;
use crate::context::error::{ContextError, ContextResult};
use crate::context::host::{HostRef, HostRegistry};
use crate::core::sync::recover_poisoned;
use crate::events::{DeliveryEvent, ErrorEvent, Event, EventKind, LogEvent};
use crate::queue::api::{EventQueue, QueueResult, QueueStats};
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

const STATE_UNINITIALIZED: u8 = 0;
const STATE_ACTIVE: u8 = 1;
const STATE_DESTROYED: u8 = 2;

/// Lifecycle of an `EventQueues` context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Built, still being configured by its owner
    Uninitialized,
    /// Shared with the library; callbacks may fire
    Active,
    /// Torn down; callbacks that still reach it drop their events
    Destroyed,
}

/// What `destroy` cleaned up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub log_events_dropped: usize,
    pub error_events_dropped: usize,
    pub delivery_events_dropped: usize,
    pub callbacks_released: usize,
}

impl TeardownReport {
    pub fn events_dropped(&self) -> usize {
        self.log_events_dropped + self.error_events_dropped + self.delivery_events_dropped
    }
}

/// Event queues plus host callback slots for one client
///
/// A queue that is not attached means that event type is disabled: handlers
/// drop those events silently. Queue and callback fields are set up through
/// `&mut self` before the context is shared, and only read afterwards until
/// `destroy` takes the callback handles.
pub struct EventQueues {
    error_queue: Option<EventQueue<ErrorEvent>>,
    log_queue: Option<EventQueue<LogEvent>>,
    delivery_queue: Option<EventQueue<DeliveryEvent>>,
    error_callback: Mutex<Option<HostRef>>,
    log_callback: Mutex<Option<HostRef>>,
    state: AtomicU8,
}

impl EventQueues {
    /// An empty context: no queues, no callbacks
    pub fn new() -> Self {
        Self {
            error_queue: None,
            log_queue: None,
            delivery_queue: None,
            error_callback: Mutex::new(None),
            log_callback: Mutex::new(None),
            state: AtomicU8::new(STATE_UNINITIALIZED),
        }
    }

    /// A context with the queues the settings enable
    pub fn from_settings(settings: &QueueSettings) -> Self {
        let mut queues = Self::new();
        if settings.log {
            queues.attach_log_queue(Some(settings.capacity));
        }
        if settings.error {
            queues.attach_error_queue(Some(settings.capacity));
        }
        if settings.delivery {
            queues.attach_delivery_queue(Some(settings.capacity));
        }
        queues
    }

    fn make_queue<T>(name: &str, capacity: Option<usize>) -> EventQueue<T> {
        match capacity {
            Some(max_size) => EventQueue::with_capacity(name, max_size),
            None => EventQueue::new(name),
        }
    }

    pub fn attach_log_queue(&mut self, capacity: Option<usize>) -> &mut Self {
        self.log_queue = Some(Self::make_queue("log", capacity));
        self
    }

    pub fn attach_error_queue(&mut self, capacity: Option<usize>) -> &mut Self {
        self.error_queue = Some(Self::make_queue("error", capacity));
        self
    }

    pub fn attach_delivery_queue(&mut self, capacity: Option<usize>) -> &mut Self {
        self.delivery_queue = Some(Self::make_queue("delivery", capacity));
        self
    }

    /// Store the host callable for error events
    ///
    /// Returns the handle it replaces, which the caller must release.
    pub fn register_error_callback(&mut self, reference: HostRef) -> Option<HostRef> {
        recover_poisoned(self.error_callback.get_mut()).replace(reference)
    }

    /// Store the host callable for log events
    ///
    /// Returns the handle it replaces, which the caller must release.
    pub fn register_log_callback(&mut self, reference: HostRef) -> Option<HostRef> {
        recover_poisoned(self.log_callback.get_mut()).replace(reference)
    }

    /// Finish setup and share the context; callbacks may fire from now on
    pub fn activate(self) -> Arc<Self> {
        self.state.store(STATE_ACTIVE, Ordering::Release);
        log::debug!(
            "Event queues active (log: {}, error: {}, delivery: {})",
            self.log_queue.is_some(),
            self.error_queue.is_some(),
            self.delivery_queue.is_some()
        );
        Arc::new(self)
    }

    pub fn state(&self) -> ContextState {
        match self.state.load(Ordering::Acquire) {
            STATE_UNINITIALIZED => ContextState::Uninitialized,
            STATE_ACTIVE => ContextState::Active,
            _ => ContextState::Destroyed,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == ContextState::Destroyed
    }

    pub fn log_queue(&self) -> Option<&EventQueue<LogEvent>> {
        self.log_queue.as_ref()
    }

    pub fn error_queue(&self) -> Option<&EventQueue<ErrorEvent>> {
        self.error_queue.as_ref()
    }

    pub fn delivery_queue(&self) -> Option<&EventQueue<DeliveryEvent>> {
        self.delivery_queue.as_ref()
    }

    pub fn error_callback(&self) -> Option<HostRef> {
        *recover_poisoned(self.error_callback.lock())
    }

    pub fn log_callback(&self) -> Option<HostRef> {
        *recover_poisoned(self.log_callback.lock())
    }

    pub fn pop_log(&self) -> QueueResult<Option<LogEvent>> {
        match &self.log_queue {
            Some(queue) => queue.pop(),
            None => Ok(None),
        }
    }

    pub fn pop_error(&self) -> QueueResult<Option<ErrorEvent>> {
        match &self.error_queue {
            Some(queue) => queue.pop(),
            None => Ok(None),
        }
    }

    pub fn pop_delivery(&self) -> QueueResult<Option<DeliveryEvent>> {
        match &self.delivery_queue {
            Some(queue) => queue.pop(),
            None => Ok(None),
        }
    }

    /// Pop one event of `kind`, or `None` if that queue is empty or disabled
    pub fn poll(&self, kind: EventKind) -> ContextResult<Option<Event>> {
        let event = match kind {
            EventKind::Log => self.pop_log()?.map(Event::from),
            EventKind::Error => self.pop_error()?.map(Event::from),
            EventKind::Delivery => self.pop_delivery()?.map(Event::from),
        };
        Ok(event)
    }

    pub fn queue_stats(&self, kind: EventKind) -> Option<QueueStats> {
        match kind {
            EventKind::Log => self.log_queue.as_ref().map(EventQueue::stats),
            EventKind::Error => self.error_queue.as_ref().map(EventQueue::stats),
            EventKind::Delivery => self.delivery_queue.as_ref().map(EventQueue::stats),
        }
    }

    /// Tear the context down
    ///
    /// Drops every event still queued, then releases the error and log host
    /// callbacks through `registry`. The owning client must be stopped first.
    /// A second call is rejected and releases nothing.
    pub fn destroy(&self, registry: &mut dyn HostRegistry) -> ContextResult<TeardownReport> {
        let previous = self.state.swap(STATE_DESTROYED, Ordering::AcqRel);
        if previous == STATE_DESTROYED {
            log::warn!("Ignoring repeated destroy of event queues");
            return Err(ContextError::AlreadyDestroyed);
        }

        let mut report = TeardownReport {
            log_events_dropped: self.log_queue.as_ref().map_or(0, |q| q.drain_with(drop)),
            error_events_dropped: self.error_queue.as_ref().map_or(0, |q| q.drain_with(drop)),
            delivery_events_dropped: self
                .delivery_queue
                .as_ref()
                .map_or(0, |q| q.drain_with(drop)),
            callbacks_released: 0,
        };

        for slot in [&self.error_callback, &self.log_callback] {
            let taken = recover_poisoned(slot.lock()).take();
            if let Some(reference) = taken {
                registry.release(reference);
                report.callbacks_released += 1;
            }
        }

        log::debug!(
            "Event queues destroyed: {} unconsumed event(s) dropped, {} callback(s) released",
            report.events_dropped(),
            report.callbacks_released
        );
        Ok(report)
    }
}

impl Default for EventQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventQueues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueues")
            .field("state", &self.state())
            .field("log_queue", &self.log_queue)
            .field("error_queue", &self.error_queue)
            .field("delivery_queue", &self.delivery_queue)
            .field("error_callback", &self.error_callback())
            .field("log_callback", &self.log_callback())
            .finish()
    }
}

impl Drop for EventQueues {
    fn drop(&mut self) {
        if self.state() == ContextState::Destroyed {
            return;
        }
        let unreleased = [&self.error_callback, &self.log_callback]
            .into_iter()
            .filter(|slot| recover_poisoned(slot.lock()).is_some())
            .count();
        if unreleased > 0 {
            log::warn!(
                "Event queues dropped without destroy; {} host callback reference(s) never released",
                unreleased
            );
        }
    }
}
