//! Synchronization utilities for robust mutex handling
//!
//! Queue locks are shared between library threads and the host thread. A panic
//! on either side while a lock is held poisons it; these helpers turn that into
//! an ordinary error so callers can drop work instead of unwinding further.

use std::sync::LockResult;

/// Convert a poisoned lock result into an application error
///
/// Works for anything wrapped in a `LockResult`: mutex guards, RwLock guards,
/// and the `(guard, WaitTimeoutResult)` pair returned by a condvar wait.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use kafka_bridge::core::sync::handle_mutex_poison;
/// use kafka_bridge::queue::api::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |message| QueueError::Poisoned { message })
///     .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). A thread panicked while holding the lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Take the guard out of a lock result even if it is poisoned
///
/// For data that stays valid whatever a panicking holder did: teardown
/// draining, and the single-value host callback slots. Refusing there would
/// leak queued events or leave a host callable unreleased.
pub fn recover_poisoned<T>(result: LockResult<T>) -> T {
    result.unwrap_or_else(|poisoned| {
        log::warn!("Recovering data from a poisoned lock");
        poisoned.into_inner()
    })
}
