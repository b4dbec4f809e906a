//! Mutex-protected FIFO shared between library threads and the host thread
//!
//! Producers push from any thread; one consumer pops. Every critical section
//! is O(1) apart from teardown draining, so lock hold times stay bounded and a
//! library callback thread is never parked behind slow host work.

use crate::core::sync::{handle_mutex_poison, recover_poisoned};
use crate::queue::error::{PushError, QueueError, QueueResult};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Point-in-time counters for a single queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Items accepted by `push`
    pub pushed: u64,
    /// Items handed out by `pop`/`pop_timeout`
    pub popped: u64,
    /// Pushes refused (full, poisoned, allocation failure)
    pub rejected: u64,
    /// Items removed by `drain_with` at teardown
    pub drained: u64,
}

impl QueueStats {
    /// Items still owned by the queue according to the counters
    ///
    /// A snapshot taken while producers are active is not atomic, so this
    /// saturates at zero rather than underflowing.
    pub fn outstanding(&self) -> u64 {
        self.pushed
            .saturating_sub(self.popped)
            .saturating_sub(self.drained)
    }
}

#[derive(Default)]
struct Counters {
    pushed: AtomicU64,
    popped: AtomicU64,
    rejected: AtomicU64,
    drained: AtomicU64,
}

/// Thread-safe FIFO of owned items
///
/// The queue exclusively owns an item between a successful `push` and the
/// `pop` (or teardown drain) that removes it. Items left behind when the
/// queue itself is dropped are dropped with it, so nothing leaks.
pub struct EventQueue<T> {
    queue_id: String,
    items: Mutex<VecDeque<T>>,
    available: Condvar,
    max_size: Option<usize>,
    counters: Counters,
}

impl<T> EventQueue<T> {
    /// Create an unbounded queue
    pub fn new(queue_id: impl Into<String>) -> Self {
        Self::build(queue_id.into(), None)
    }

    /// Create a queue that refuses pushes once `max_size` items are waiting
    pub fn with_capacity(queue_id: impl Into<String>, max_size: usize) -> Self {
        Self::build(queue_id.into(), Some(max_size))
    }

    fn build(queue_id: String, max_size: Option<usize>) -> Self {
        Self {
            queue_id,
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            max_size,
            counters: Counters::default(),
        }
    }

    pub fn queue_id(&self) -> &str {
        &self.queue_id
    }

    pub fn capacity(&self) -> Option<usize> {
        self.max_size
    }

    fn lock(&self) -> QueueResult<MutexGuard<'_, VecDeque<T>>> {
        handle_mutex_poison(self.items.lock(), |message| QueueError::Poisoned { message })
    }

    fn reject(&self, item: T, cause: QueueError) -> PushError<T> {
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        log::trace!("Queue '{}' rejected push: {}", self.queue_id, cause);
        PushError::new(item, cause)
    }

    /// Append an item at the tail
    ///
    /// Never blocks beyond acquiring the lock. On failure the item comes back
    /// inside the error and the queue is left exactly as it was.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut items = match self.lock() {
            Ok(items) => items,
            Err(cause) => return Err(self.reject(item, cause)),
        };

        if let Some(max_size) = self.max_size {
            if items.len() >= max_size {
                drop(items);
                return Err(self.reject(item, QueueError::QueueFull { max_size }));
            }
        }

        // Grow fallibly so an exhausted allocator surfaces as a rejected push
        if items.try_reserve(1).is_err() {
            drop(items);
            return Err(self.reject(item, QueueError::AllocationFailed));
        }

        items.push_back(item);
        self.counters.pushed.fetch_add(1, Ordering::Release);
        drop(items);

        self.available.notify_one();
        Ok(())
    }

    /// Remove the head item, or `None` when the queue is empty
    pub fn pop(&self) -> QueueResult<Option<T>> {
        let item = self.lock()?.pop_front();
        if item.is_some() {
            self.counters.popped.fetch_add(1, Ordering::Release);
        }
        Ok(item)
    }

    /// Remove the head item, waiting at most `timeout` for one to arrive
    pub fn pop_timeout(&self, timeout: Duration) -> QueueResult<Option<T>> {
        let deadline = Instant::now() + timeout;
        let mut items = self.lock()?;

        loop {
            if let Some(item) = items.pop_front() {
                self.counters.popped.fetch_add(1, Ordering::Release);
                return Ok(Some(item));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            let (guard, _) = handle_mutex_poison(
                self.available.wait_timeout(items, deadline - now),
                |message| QueueError::Poisoned { message },
            )?;
            items = guard;
        }
    }

    /// Remove every remaining item and hand each one to `dispose`
    ///
    /// Used at teardown. A poisoned lock is recovered rather than reported,
    /// since refusing to drain would leak whatever is still queued.
    pub fn drain_with<F>(&self, mut dispose: F) -> usize
    where
        F: FnMut(T),
    {
        let remaining = mem::take(&mut *recover_poisoned(self.items.lock()));
        let count = remaining.len();
        self.counters
            .drained
            .fetch_add(count as u64, Ordering::Release);

        for item in remaining {
            dispose(item);
        }

        if count > 0 {
            log::debug!("Drained {} unconsumed item(s) from queue '{}'", count, self.queue_id);
        }
        count
    }

    /// Number of items waiting (0 if the lock is poisoned)
    pub fn len(&self) -> usize {
        self.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the counters
    ///
    /// Removals are read before `pushed`, so `popped + drained` never exceeds
    /// `pushed` in the result even while other threads are working.
    pub fn stats(&self) -> QueueStats {
        let popped = self.counters.popped.load(Ordering::Acquire);
        let drained = self.counters.drained.load(Ordering::Acquire);
        let rejected = self.counters.rejected.load(Ordering::Relaxed);
        let pushed = self.counters.pushed.load(Ordering::Acquire);
        QueueStats {
            pushed,
            popped,
            rejected,
            drained,
        }
    }
}

#[cfg(test)]
impl<T: Send> EventQueue<T> {
    /// Poison the queue lock by panicking on another thread while holding it
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _items = self.items.lock();
                    panic!("poisoning queue '{}'", self.queue_id);
                })
                .join();
        });
    }
}

impl<T> fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("queue_id", &self.queue_id)
            .field("len", &self.len())
            .field("max_size", &self.max_size)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_creation() {
        let queue: EventQueue<u32> = EventQueue::new("log");

        assert_eq!(queue.queue_id(), "log");
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), None);
        assert_eq!(queue.stats(), QueueStats::default());
    }

    #[test]
    fn test_push_pop_preserves_fifo_order() {
        let queue = EventQueue::new("fifo");

        for i in 0..5 {
            queue.push(i).unwrap();
        }

        let popped: Vec<i32> = std::iter::from_fn(|| queue.pop().unwrap()).collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
        assert!(queue.pop().unwrap().is_none());
    }

    #[test]
    fn test_pop_on_empty_queue_returns_none() {
        let queue: EventQueue<String> = EventQueue::new("empty");
        assert!(queue.pop().unwrap().is_none());
        assert_eq!(queue.stats().popped, 0);
    }

    #[test]
    fn test_queue_size_limit_returns_item() {
        let queue = EventQueue::with_capacity("bounded", 2);

        queue.push("first".to_string()).unwrap();
        queue.push("second".to_string()).unwrap();

        let rejected = queue.push("third".to_string()).unwrap_err();
        assert_eq!(rejected.cause(), &QueueError::QueueFull { max_size: 2 });
        assert_eq!(rejected.into_inner(), "third");

        // The refused push left the queue untouched
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().as_deref(), Some("first"));

        let stats = queue.stats();
        assert_eq!(stats.pushed, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.popped, 1);
        assert_eq!(stats.outstanding(), 1);
    }

    #[test]
    fn test_capacity_frees_up_after_pop() {
        let queue = EventQueue::with_capacity("bounded", 1);

        queue.push(1).unwrap();
        assert!(queue.push(2).is_err());

        assert_eq!(queue.pop().unwrap(), Some(1));
        assert!(queue.push(3).is_ok());
    }

    #[test]
    fn test_drain_with_disposes_everything() {
        let queue = EventQueue::new("drain");
        for i in 0..10 {
            queue.push(i).unwrap();
        }
        queue.pop().unwrap();

        let mut disposed = Vec::new();
        let count = queue.drain_with(|item| disposed.push(item));

        assert_eq!(count, 9);
        assert_eq!(disposed, (1..10).collect::<Vec<_>>());
        assert!(queue.is_empty());
        assert_eq!(queue.stats().drained, 9);
        assert_eq!(queue.stats().outstanding(), 0);
    }

    #[test]
    fn test_pop_timeout_expires_on_empty_queue() {
        let queue: EventQueue<u8> = EventQueue::new("timeout");

        let start = Instant::now();
        let result = queue.pop_timeout(Duration::from_millis(20)).unwrap();

        assert!(result.is_none());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pop_timeout_wakes_on_push() {
        use std::sync::Arc;

        let queue = Arc::new(EventQueue::new("wake"));
        let producer = Arc::clone(&queue);

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            producer.push(99u32).unwrap();
        });

        let result = queue.pop_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();

        assert_eq!(result, Some(99));
    }

    #[test]
    fn test_push_error_display() {
        let queue = EventQueue::with_capacity("display", 0);
        let err = queue.push(()).unwrap_err();

        assert_eq!(err.to_string(), "Push rejected: Queue is full (max size: 0)");
        assert!(format!("{:?}", err).contains("QueueFull"));
    }

    #[test]
    fn test_outstanding_saturates_on_skewed_counters() {
        let stats = QueueStats {
            pushed: 3,
            popped: 4,
            rejected: 0,
            drained: 1,
        };
        assert_eq!(stats.outstanding(), 0);
    }
}
