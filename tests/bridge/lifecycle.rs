//! Context lifecycle through the public API

use crate::common::{full_context, RecordingRegistry};
use kafka_bridge::callbacks::api::{delivery_callback, error_callback, log_callback, DeliveryReport, OpaqueRef};
use kafka_bridge::context::{ContextError, ContextState, EventQueues, HostRef};
use kafka_bridge::events::{DeliveryEvent, ErrorCode, Event, EventKind};

#[test]
fn test_log_callback_released_exactly_once() {
    let mut queues = EventQueues::new();
    queues.attach_log_queue(None);
    let log_ref = HostRef::new(11);
    assert!(queues.register_log_callback(log_ref).is_none());
    let context = queues.activate();
    let mut registry = RecordingRegistry::default();

    let report = context.destroy(&mut registry).unwrap();
    assert_eq!(report.callbacks_released, 1);
    assert_eq!(registry.times_released(log_ref), 1);

    assert_eq!(context.destroy(&mut registry), Err(ContextError::AlreadyDestroyed));
    assert_eq!(registry.times_released(log_ref), 1);
}

#[test]
fn test_events_flow_in_per_queue_order() {
    let context = full_context(None);
    let opaque = OpaqueRef::new(&context);

    log_callback(&opaque, 6, "A", "first");
    error_callback(&(), -195, "transport down", &opaque);
    log_callback(&opaque, 4, "B", "second");
    delivery_callback(&(), DeliveryReport::new(ErrorCode::new(7), Some(DeliveryEvent::new(2))), &opaque);
    delivery_callback(&(), DeliveryReport::new(ErrorCode::NO_ERROR, Some(DeliveryEvent::new(3))), &opaque);

    let logs: Vec<String> = std::iter::from_fn(|| context.pop_log().unwrap())
        .map(|event| event.message().to_string())
        .collect();
    assert_eq!(logs, vec!["first", "second"]);

    match context.poll(EventKind::Error).unwrap() {
        Some(Event::Error(event)) => {
            assert_eq!(event.code().name(), Some("_TRANSPORT"));
            assert_eq!(event.reason(), "transport down");
        }
        other => panic!("expected an error event, got {:?}", other),
    }

    let failed = context.pop_delivery().unwrap().unwrap();
    assert_eq!((failed.callback_id(), failed.code()), (2, ErrorCode::new(7)));
    let delivered = context.pop_delivery().unwrap().unwrap();
    assert_eq!((delivered.callback_id(), delivered.code()), (3, ErrorCode::NO_ERROR));
    assert!(context.poll(EventKind::Delivery).unwrap().is_none());
}

#[test]
fn test_teardown_drops_unconsumed_events() {
    let context = full_context(None);
    let opaque = OpaqueRef::new(&context);
    for i in 0..5 {
        log_callback(&opaque, 7, "DEBUG", &format!("line {}", i));
    }
    error_callback(&(), -1, "unread", &opaque);
    delivery_callback(&(), DeliveryReport::new(ErrorCode::NO_ERROR, Some(DeliveryEvent::new(1))), &opaque);

    let report = context.destroy(&mut RecordingRegistry::default()).unwrap();

    assert_eq!(report.log_events_dropped, 5);
    assert_eq!(report.error_events_dropped, 1);
    assert_eq!(report.delivery_events_dropped, 1);
    assert_eq!(context.state(), ContextState::Destroyed);
    assert!(context.log_queue().unwrap().is_empty());
}

#[test]
fn test_callbacks_are_inert_once_wrapper_lets_go() {
    let context = full_context(None);
    let opaque = OpaqueRef::new(&context);
    context.destroy(&mut RecordingRegistry::default()).unwrap();
    drop(context);

    // Nothing to observe except that none of these touch freed state
    log_callback(&opaque, 3, "LATE", "after free");
    error_callback(&(), -1, "after free", &opaque);
    delivery_callback(&(), DeliveryReport::new(ErrorCode::new(7), Some(DeliveryEvent::new(1))), &opaque);
    assert!(opaque.upgrade().is_none());
}
