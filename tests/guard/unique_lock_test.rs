/*!
 * UniqueLock Tests
 *
 * Acquisition policies, ownership transfer and scoped release
 */

use rtos_std::{Mutex, UniqueLock};
use std::sync::Arc;
use std::thread;

#[test]
fn test_try_guard_on_locked_mutex_does_not_own() {
    let mutex = Arc::new(Mutex::new());
    mutex.lock();

    let contender = mutex.clone();
    thread::spawn(move || {
        let guard = UniqueLock::try_new(&*contender);
        assert!(!guard.owns_lock());
        assert!(guard.mutex().is_some());
        // Dropping a non-owning guard must not unlock
    })
    .join()
    .unwrap();

    assert!(!mutex.try_lock());
    mutex.unlock();
}

#[test]
fn test_try_guard_on_free_mutex_owns() {
    let mutex = Mutex::new();
    {
        let guard = UniqueLock::try_new(&mutex);
        assert!(guard.owns_lock());
    }
    assert!(mutex.try_lock());
    mutex.unlock();
}

#[test]
fn test_adopt_takes_over_existing_lock() {
    let mutex = Mutex::new();
    mutex.lock();
    {
        let guard = UniqueLock::adopt(&mutex);
        assert!(guard.owns_lock());
    }
    // The adopted lock was released by the guard
    assert!(mutex.try_lock());
    mutex.unlock();
}

#[test]
fn test_deferred_guard_locks_on_demand() {
    let mutex = Mutex::new();
    let mut guard = UniqueLock::deferred(&mutex);
    assert!(mutex.try_lock());
    mutex.unlock();

    guard.lock();
    assert!(!mutex.try_lock());
    guard.unlock();
    assert!(guard.try_lock());
}

#[test]
fn test_move_transfers_ownership() {
    let mutex = Mutex::new();
    let mut source = UniqueLock::new(&mutex);
    let target = std::mem::take(&mut source);

    assert!(!source.owns_lock());
    assert!(source.mutex().is_none());
    assert!(target.owns_lock());

    drop(source);
    assert!(!mutex.try_lock());
    drop(target);
    assert!(mutex.try_lock());
    mutex.unlock();
}

#[test]
fn test_guard_moves_across_threads() {
    let mutex: &'static Mutex = Box::leak(Box::new(Mutex::new()));
    let guard = UniqueLock::new(mutex);

    thread::spawn(move || {
        assert!(guard.owns_lock());
        drop(guard);
    })
    .join()
    .unwrap();

    assert!(mutex.try_lock());
    mutex.unlock();
}

#[test]
fn test_release_hands_lock_to_caller() {
    let mutex = Mutex::new();
    let mut guard = UniqueLock::new(&mutex);
    let released = guard.release().unwrap();
    drop(guard);

    assert!(!released.try_lock());
    released.unlock();
    assert!(mutex.try_lock());
    mutex.unlock();
}
