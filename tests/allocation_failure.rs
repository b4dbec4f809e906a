//! Exhausted memory drops events instead of aborting
//!
//! The global allocator here refuses any request above a per-thread size
//! limit. The limit is only armed around the call under test, and results are
//! checked after it is lifted so assertion messages can still allocate.

use kafka_bridge::callbacks::api::{delivery_callback, error_callback, log_callback, DeliveryReport, OpaqueRef};
use kafka_bridge::context::EventQueues;
use kafka_bridge::events::{DeliveryEvent, ErrorCode, ErrorEvent, LogEvent};
use kafka_bridge::queue::api::{EventQueue, QueueError};
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::Arc;

thread_local! {
    static ALLOCATION_LIMIT: Cell<usize> = const { Cell::new(usize::MAX) };
}

struct LimitedAllocator;

fn over_limit(size: usize) -> bool {
    ALLOCATION_LIMIT
        .try_with(|limit| size > limit.get())
        .unwrap_or(false)
}

unsafe impl GlobalAlloc for LimitedAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if over_limit(layout.size()) {
            return std::ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if over_limit(new_size) {
            return std::ptr::null_mut();
        }
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static ALLOCATOR: LimitedAllocator = LimitedAllocator;

struct LimitGuard;

impl Drop for LimitGuard {
    fn drop(&mut self) {
        ALLOCATION_LIMIT.with(|limit| limit.set(usize::MAX));
    }
}

/// Run `body` on this thread with allocations above `limit` bytes refused
fn with_allocation_limit<R>(limit: usize, body: impl FnOnce() -> R) -> R {
    ALLOCATION_LIMIT.with(|cell| cell.set(limit));
    let _guard = LimitGuard;
    body()
}

fn context() -> Arc<EventQueues> {
    let mut queues = EventQueues::new();
    queues
        .attach_log_queue(None)
        .attach_error_queue(None)
        .attach_delivery_queue(None);
    queues.activate()
}

#[test]
fn test_envelope_copy_fails_cleanly() {
    let big = "m".repeat(64 * 1024);

    let (log_event, error_event) = with_allocation_limit(4096, || {
        let log_event = LogEvent::try_new(6, "BROKER", &big);
        let error_event = ErrorEvent::try_new(ErrorCode::new(-195), &big);
        (log_event.is_none(), error_event.is_none())
    });

    assert!(log_event, "log payload copy should fail over the limit");
    assert!(error_event, "error payload copy should fail over the limit");
    assert!(LogEvent::try_new(6, "BROKER", &big).is_some());
}

#[test]
fn test_oversized_log_message_is_dropped() {
    let context = context();
    let opaque = OpaqueRef::new(&context);
    let big = "x".repeat(256 * 1024);

    with_allocation_limit(4096, || log_callback(&opaque, 6, "facility1", &big));

    let queue = context.log_queue().unwrap();
    assert!(queue.is_empty());
    assert_eq!(queue.stats().pushed, 0);
    assert_eq!(queue.stats().rejected, 0);

    // nothing is left broken once memory is available again
    log_callback(&opaque, 6, "facility1", "fits");
    assert_eq!(context.pop_log().unwrap().unwrap().message(), "fits");
}

#[test]
fn test_oversized_error_reason_is_dropped() {
    let context = context();
    let opaque = OpaqueRef::new(&context);
    let big = "r".repeat(256 * 1024);

    with_allocation_limit(4096, || error_callback(&(), -195, &big, &opaque));

    let queue = context.error_queue().unwrap();
    assert!(queue.is_empty());
    assert_eq!(queue.stats().pushed, 0);
}

#[test]
fn test_queue_growth_failure_rejects_push() {
    let queue: EventQueue<u64> = EventQueue::new("starved");

    let outcome = with_allocation_limit(8, || match queue.push(42) {
        Ok(()) => None,
        Err(rejected) => {
            let (item, cause) = rejected.into_parts();
            Some((item, cause == QueueError::AllocationFailed))
        }
    });

    assert_eq!(outcome, Some((42, true)));
    let stats = queue.stats();
    assert_eq!((stats.pushed, stats.rejected), (0, 1));
    assert!(queue.is_empty());

    queue.push(43).unwrap();
    assert_eq!(queue.pop().unwrap(), Some(43));
}

#[test]
fn test_delivery_report_dropped_when_queue_cannot_grow() {
    let context = context();
    let opaque = OpaqueRef::new(&context);

    with_allocation_limit(8, || {
        delivery_callback(
            &(),
            DeliveryReport::new(ErrorCode::new(7), Some(DeliveryEvent::new(3))),
            &opaque,
        )
    });

    let stats = context.delivery_queue().unwrap().stats();
    assert_eq!((stats.pushed, stats.rejected), (0, 1));
    assert!(context.pop_delivery().unwrap().is_none());
}
