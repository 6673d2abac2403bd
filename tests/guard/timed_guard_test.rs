/*!
 * Timed Guard Tests
 */

use rtos_std::{SteadyClock, TimedMutex, UniqueLock};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_try_for_expires_without_owning() {
    let mutex = Arc::new(TimedMutex::new());
    mutex.lock();

    let contender = mutex.clone();
    let (owned, elapsed) = thread::spawn(move || {
        let start = Instant::now();
        let guard = UniqueLock::try_for(&*contender, Duration::from_millis(20));
        (guard.owns_lock(), start.elapsed())
    })
    .join()
    .unwrap();

    assert!(!owned);
    assert!(elapsed >= Duration::from_millis(20));
    assert!(!mutex.try_lock());
    mutex.unlock();
}

#[test]
fn test_try_until_acquires_free_mutex() {
    let mutex = TimedMutex::new();
    let mut guard = UniqueLock::try_until(&mutex, SteadyClock::now() + Duration::from_secs(1));
    assert!(guard.owns_lock());
    guard.unlock();
    assert!(guard.try_lock_for(Duration::ZERO));
}

#[test]
fn test_generic_over_lock_type() {
    fn critical<M: rtos_std::RawLock>(mutex: &M) -> bool {
        let guard = UniqueLock::new(mutex);
        guard.owns_lock()
    }

    assert!(critical(&TimedMutex::new()));
    assert!(critical(&rtos_std::Mutex::new()));
}
