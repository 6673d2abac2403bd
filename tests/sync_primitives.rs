/*!
 * Synchronization Primitives Integration Tests
 *
 * Mutual exclusion, non-blocking and bounded acquisition for Mutex and
 * TimedMutex, driven from both host threads and kernel threads
 */

use rtos_std::{Mutex, SteadyClock, Thread, TimedMutex, UniqueLock};
use serial_test::serial;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_mutual_exclusion_under_contention() {
    let mutex = Arc::new(Mutex::new());
    let held = Arc::new(AtomicBool::new(false));
    let overlapped = Arc::new(AtomicBool::new(false));
    let counter = Arc::new(AtomicU64::new(0));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let mutex = mutex.clone();
            let held = held.clone();
            let overlapped = overlapped.clone();
            let counter = counter.clone();
            Thread::spawn(move || {
                for _ in 0..500 {
                    let _guard = UniqueLock::new(&*mutex);
                    if held.swap(true, Ordering::SeqCst) {
                        overlapped.store(true, Ordering::SeqCst);
                    }
                    // Non-atomic read-modify-write, only safe under the lock
                    let value = counter.load(Ordering::Relaxed);
                    counter.store(value + 1, Ordering::Relaxed);
                    held.store(false, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for worker in &workers {
        worker.join();
    }
    assert!(!overlapped.load(Ordering::SeqCst), "two holders at once");
    assert_eq!(counter.load(Ordering::SeqCst), 8 * 500);
    assert!(mutex.try_lock());
    mutex.unlock();
}

#[test]
fn test_try_lock_never_blocks() {
    let mutex = Arc::new(Mutex::new());
    mutex.lock();

    let contender = mutex.clone();
    let start = Instant::now();
    let acquired = thread::spawn(move || contender.try_lock()).join().unwrap();
    assert!(!acquired);
    assert!(start.elapsed() < Duration::from_millis(100));

    mutex.unlock();
    let contender = mutex.clone();
    let acquired = thread::spawn(move || {
        let ok = contender.try_lock();
        if ok {
            contender.unlock();
        }
        ok
    })
    .join()
    .unwrap();
    assert!(acquired);
}

#[test]
fn test_zero_and_past_bounds_degenerate_to_try_lock() {
    let mutex = TimedMutex::new();
    assert!(mutex.try_lock_for(Duration::ZERO));

    let start = Instant::now();
    assert!(!mutex.try_lock_for(Duration::ZERO));
    assert!(!mutex.try_lock_until(SteadyClock::now()));
    assert!(!mutex.try_lock_until(SteadyClock::now() - Duration::from_millis(500)));
    assert!(start.elapsed() < Duration::from_millis(100));

    mutex.unlock();
    assert!(mutex.try_lock_until(SteadyClock::now() - Duration::from_millis(500)));
    mutex.unlock();
}

#[test]
#[serial]
fn test_bounded_wait_times_out() {
    let mutex = Arc::new(TimedMutex::new());
    mutex.lock();

    let contender = mutex.clone();
    let handle = thread::spawn(move || {
        let start = Instant::now();
        let acquired = contender.try_lock_for(Duration::from_millis(50));
        (acquired, start.elapsed())
    });

    let (acquired, elapsed) = handle.join().unwrap();
    assert!(!acquired);
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(2));
    mutex.unlock();
}

#[test]
#[serial]
fn test_bounded_wait_succeeds_on_release() {
    let mutex = Arc::new(TimedMutex::new());
    mutex.lock();

    let contender = mutex.clone();
    let handle = thread::spawn(move || {
        let deadline = SteadyClock::now() + Duration::from_secs(5);
        let acquired = contender.try_lock_until(deadline);
        if acquired {
            contender.unlock();
        }
        acquired
    });

    thread::sleep(Duration::from_millis(20));
    mutex.unlock();
    assert!(handle.join().unwrap());
}

#[test]
fn test_unlock_hands_slot_to_waiter() {
    let mutex = Arc::new(Mutex::new());
    mutex.lock();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let mutex = mutex.clone();
            thread::spawn(move || {
                mutex.lock();
                mutex.unlock();
            })
        })
        .collect();

    // Semaphore count goes negative with each queued acquirer
    while mutex.native_handle().count() > -3 {
        thread::sleep(Duration::from_millis(1));
    }
    mutex.unlock();

    for waiter in waiters {
        waiter.join().unwrap();
    }
    assert_eq!(mutex.native_handle().count(), 1);
}
