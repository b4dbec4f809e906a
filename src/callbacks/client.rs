//! How callbacks find their context
//!
//! The client wrapper owns the context through an `Arc`. The library only
//! ever holds an `OpaqueRef`, a `Weak` that stops resolving once the wrapper
//! lets go, so a late callback cannot reach freed state.

use crate::context::EventQueues;
use crate::events::{DeliveryEvent, ErrorCode};
use std::sync::{Arc, Weak};

/// The library's per-client handle, as seen from inside a callback
pub trait ClientHandle {
    /// The context configured for this client, if any is still alive
    fn opaque(&self) -> Option<Arc<EventQueues>>;
}

/// Non-owning reference to a client's `EventQueues`
///
/// Installed as the client's opaque context and passed as the fixed opaque
/// argument when registering the error and delivery callbacks.
#[derive(Debug, Clone, Default)]
pub struct OpaqueRef {
    context: Weak<EventQueues>,
}

impl OpaqueRef {
    pub fn new(context: &Arc<EventQueues>) -> Self {
        Self {
            context: Arc::downgrade(context),
        }
    }

    /// A reference that never resolves, for clients configured without a context
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn upgrade(&self) -> Option<Arc<EventQueues>> {
        self.context.upgrade()
    }
}

impl ClientHandle for OpaqueRef {
    fn opaque(&self) -> Option<Arc<EventQueues>> {
        self.upgrade()
    }
}

/// The library's report on one produced message
///
/// `token` is the `DeliveryEvent` the sender attached when producing the
/// message; ownership comes back to the bridge with the report.
#[derive(Debug)]
pub struct DeliveryReport {
    code: ErrorCode,
    token: Option<DeliveryEvent>,
}

impl DeliveryReport {
    pub fn new(code: ErrorCode, token: Option<DeliveryEvent>) -> Self {
        Self { code, token }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn into_parts(self) -> (ErrorCode, Option<DeliveryEvent>) {
        (self.code, self.token)
    }
}
