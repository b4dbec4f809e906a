//! Shared fixtures for integration tests

use kafka_bridge::context::{EventQueues, HostRef, HostRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// Context with all three queues attached, already shared
pub fn full_context(capacity: Option<usize>) -> Arc<EventQueues> {
    let mut queues = EventQueues::new();
    queues
        .attach_log_queue(capacity)
        .attach_error_queue(capacity)
        .attach_delivery_queue(capacity);
    queues.activate()
}

/// Registry that records every release
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    pub released: HashMap<HostRef, usize>,
}

impl RecordingRegistry {
    pub fn times_released(&self, reference: HostRef) -> usize {
        self.released.get(&reference).copied().unwrap_or(0)
    }
}

impl HostRegistry for RecordingRegistry {
    fn release(&mut self, reference: HostRef) {
        *self.released.entry(reference).or_insert(0) += 1;
    }
}
