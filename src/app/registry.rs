//! Host callback table
//!
//! Owns the host's callables and hands out `HostRef` slots for them. Slots
//! are what the context stores and what delivery tokens carry as their
//! callback id.

use crate::context::{HostRef, HostRegistry};
use crate::events::Event;
use std::collections::HashMap;
use std::fmt;

pub type HostCallable = Box<dyn FnMut(&Event)>;

pub struct CallbackTable {
    slots: HashMap<HostRef, HostCallable>,
    next_slot: i32,
    released: usize,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            next_slot: 1,
            released: 0,
        }
    }

    pub fn register<F>(&mut self, callable: F) -> HostRef
    where
        F: FnMut(&Event) + 'static,
    {
        let reference = HostRef::new(self.next_slot);
        self.next_slot += 1;
        self.slots.insert(reference, Box::new(callable));
        reference
    }

    /// Call the callable behind `reference`; false if the slot is empty
    pub fn invoke(&mut self, reference: HostRef, event: &Event) -> bool {
        match self.slots.get_mut(&reference) {
            Some(callable) => {
                callable(event);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, reference: HostRef) -> bool {
        self.slots.contains_key(&reference)
    }

    pub fn live(&self) -> usize {
        self.slots.len()
    }

    pub fn released(&self) -> usize {
        self.released
    }
}

impl HostRegistry for CallbackTable {
    fn release(&mut self, reference: HostRef) {
        if self.slots.remove(&reference).is_some() {
            self.released += 1;
            log::trace!("Released host callable {}", reference);
        } else {
            log::warn!("Release of unknown host callable {}", reference);
        }
    }
}

impl Default for CallbackTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackTable")
            .field("live", &self.slots.len())
            .field("released", &self.released)
            .finish()
    }
}
