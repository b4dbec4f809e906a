//! Library callback handlers
//!
//! Each handler runs on a library thread, turns the native arguments into an
//! owned event and pushes it onto the matching queue. Handlers are infallible
//! from the library's side: a disabled queue, a destroyed context, a failed
//! allocation or a refused push all end with the event being dropped on the
//! spot, and a panic never unwinds back into the library.

use crate::callbacks::client::{ClientHandle, DeliveryReport, OpaqueRef};
use crate::context::EventQueues;
use crate::events::{ErrorCode, ErrorEvent, EventKind, LogEvent};
use crate::queue::api::PushError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Run a handler body, containing any panic on this side of the boundary
fn guarded<F: FnOnce()>(kind: EventKind, body: F) {
    if panic::catch_unwind(AssertUnwindSafe(body)).is_err() {
        log::error!("Panic in {} callback contained; event dropped", kind.name());
    }
}

/// The context, unless it is gone or already torn down
fn live(context: Option<Arc<EventQueues>>) -> Option<Arc<EventQueues>> {
    context.filter(|context| !context.is_destroyed())
}

fn discard<T>(kind: EventKind, rejected: PushError<T>) {
    let (event, cause) = rejected.into_parts();
    drop(event);
    log::trace!("Dropped {} event: {}", kind.name(), cause);
}

/// Log callback: the context comes from the client's opaque accessor
pub fn log_callback<C>(client: &C, level: i32, facility: &str, message: &str)
where
    C: ClientHandle + ?Sized,
{
    guarded(EventKind::Log, || {
        let Some(context) = live(client.opaque()) else {
            return;
        };
        let Some(queue) = context.log_queue() else {
            return;
        };
        let Some(event) = LogEvent::try_new(level, facility, message) else {
            log::trace!("Dropped log event: could not copy payload");
            return;
        };
        if let Err(rejected) = queue.push(event) {
            discard(EventKind::Log, rejected);
        }
    });
}

/// Error callback: the context is the opaque reference given at registration
pub fn error_callback<C>(_client: &C, code: i32, reason: &str, opaque: &OpaqueRef)
where
    C: ?Sized,
{
    guarded(EventKind::Error, || {
        let Some(context) = live(opaque.upgrade()) else {
            return;
        };
        let Some(queue) = context.error_queue() else {
            return;
        };
        let Some(event) = ErrorEvent::try_new(ErrorCode::new(code), reason) else {
            log::trace!("Dropped error event: could not copy payload");
            return;
        };
        if let Err(rejected) = queue.push(event) {
            discard(EventKind::Error, rejected);
        }
    });
}

/// Delivery-report callback
///
/// Messages produced without a token are fire-and-forget and ignored. A
/// failure code overwrites the token's stored code; success leaves the
/// default in place. Reports for different messages may arrive in any order.
pub fn delivery_callback<C>(_client: &C, report: DeliveryReport, opaque: &OpaqueRef)
where
    C: ?Sized,
{
    guarded(EventKind::Delivery, move || {
        let (code, token) = report.into_parts();
        let Some(mut event) = token else {
            return;
        };
        let Some(context) = live(opaque.upgrade()) else {
            return;
        };
        let Some(queue) = context.delivery_queue() else {
            return;
        };
        event.record_failure(code);
        if let Err(rejected) = queue.push(event) {
            discard(EventKind::Delivery, rejected);
        }
    });
}
