//! Library threads against a single host consumer

use crate::common::full_context;
use kafka_bridge::callbacks::api::{log_callback, OpaqueRef};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const PRODUCERS: usize = 8;
const EVENTS_PER_PRODUCER: usize = 1000;

#[test]
fn test_concurrent_consumer_sees_every_event_in_producer_order() {
    let context = full_context(None);
    let opaque = OpaqueRef::new(&context);
    let producers_done = Arc::new(AtomicBool::new(false));

    let consumer = {
        let context = Arc::clone(&context);
        let producers_done = Arc::clone(&producers_done);
        thread::spawn(move || {
            let queue = context.log_queue().unwrap();
            let mut last_seen = vec![None::<usize>; PRODUCERS];
            let mut observed = 0usize;
            loop {
                match queue.pop_timeout(Duration::from_millis(5)).unwrap() {
                    Some(event) => {
                        let producer: usize = event.facility().parse().unwrap();
                        let sequence: usize = event.message().parse().unwrap();
                        if let Some(previous) = last_seen[producer] {
                            assert!(sequence > previous, "producer {} reordered", producer);
                        }
                        last_seen[producer] = Some(sequence);
                        observed += 1;
                    }
                    None if producers_done.load(Ordering::Acquire) && queue.is_empty() => break,
                    None => {}
                }
            }
            observed
        })
    };

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let opaque = opaque.clone();
            thread::spawn(move || {
                let facility = producer.to_string();
                for sequence in 0..EVENTS_PER_PRODUCER {
                    log_callback(&opaque, 7, &facility, &sequence.to_string());
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    producers_done.store(true, Ordering::Release);

    assert_eq!(consumer.join().unwrap(), PRODUCERS * EVENTS_PER_PRODUCER);
    let stats = context.log_queue().unwrap().stats();
    assert_eq!(stats.pushed, (PRODUCERS * EVENTS_PER_PRODUCER) as u64);
    assert_eq!(stats.rejected, 0);
}

#[test]
fn test_bounded_queue_never_blocks_producers() {
    let context = full_context(Some(16));
    let opaque = OpaqueRef::new(&context);

    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let opaque = opaque.clone();
            thread::spawn(move || {
                for sequence in 0..500 {
                    log_callback(&opaque, 6, &producer.to_string(), &sequence.to_string());
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let stats = context.log_queue().unwrap().stats();
    assert_eq!(stats.pushed + stats.rejected, 2000);
    assert_eq!(context.log_queue().unwrap().len(), 16);
}
