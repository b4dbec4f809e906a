//! Host-side callback handles
//!
//! The host keeps its callables in its own registry and gives the bridge an
//! integer slot for each. The bridge never calls them; it stores the slots so
//! the host's dispatch can look them up, and releases each exactly once when
//! the context is destroyed.

use serde::Serialize;
use std::fmt;

/// Reference to a callable held in the host's registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HostRef(i32);

impl HostRef {
    pub const fn new(slot: i32) -> Self {
        Self(slot)
    }

    pub const fn slot(self) -> i32 {
        self.0
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref#{}", self.0)
    }
}

/// The host's callback registry, as seen from teardown
///
/// Only ever called on the host thread.
pub trait HostRegistry {
    /// Drop the registry's hold on `reference`
    fn release(&mut self, reference: HostRef);
}
