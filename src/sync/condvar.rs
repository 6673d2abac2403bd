/*!
 * Condition Variable
 *
 * Priority-ordered wait queue paired with a `Mutex`.
 *
 * # Wait Protocol
 *
 * Under the system lock, in this order:
 * 1. Release the mutex slot (no reschedule)
 * 2. Insert the caller into the wait queue by priority
 * 3. Sleep; the system lock is handed back only once the caller is parked
 * 4. On wake, reacquire the mutex slot, blocking on it if contended
 *
 * Taking the system lock before releasing the slot is what keeps a notifier
 * from running between steps 1 and 2. Step 4 runs on every outcome, timeout
 * included, so the mutex is always held again on return.
 *
 * `notify_one` readies without rescheduling; `notify_all` requests a
 * reschedule after the broadcast.
 */

use super::mutex::Mutex;
use super::unique_lock::UniqueLock;
use crate::chrono::{SteadyClock, TimePoint};
use crate::core::limits::TIME_IMMEDIATE;
use crate::core::types::Ticks;
use crate::kernel::{
    current, duration_to_ticks, go_sleep_s, go_sleep_timeout_s, halt, lock, ready_i,
    reschedule_s, ticks_to_us, wakeup_s, ThreadState, ThreadsQueue, WakeMsg,
};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Outcome of a timed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvStatus {
    NoTimeout,
    Timeout,
}

/// Condition variable
pub struct Condvar {
    queue: ThreadsQueue,
}

impl Condvar {
    pub const fn new() -> Self {
        Self {
            queue: ThreadsQueue::new(),
        }
    }

    /// Wake the highest-priority, longest-waiting thread, if any
    pub fn notify_one(&self) {
        let mut guard = lock();
        if let Some(waiter) = self.queue.fifo_remove(&mut guard) {
            wakeup_s(&mut guard, &waiter, WakeMsg::Ok);
        }
    }

    /// Wake every waiting thread
    pub fn notify_all(&self) {
        let mut guard = lock();
        while let Some(waiter) = self.queue.fifo_remove(&mut guard) {
            ready_i(&mut guard, &waiter, WakeMsg::Reset);
        }
        reschedule_s(&mut guard);
    }

    /// Release the lock, wait for a notification, then lock again
    ///
    /// Halts if `lock` does not own its mutex. Wakeups may be spurious.
    pub fn wait(&self, lock: &mut UniqueLock<'_, Mutex>) {
        self.suspend(lock, None);
    }

    /// `wait` with a relative timeout
    ///
    /// A zero timeout returns `Timeout` at once without releasing the lock.
    pub fn wait_for(&self, lock: &mut UniqueLock<'_, Mutex>, timeout: Duration) -> CvStatus {
        let ticks = duration_to_ticks(timeout);
        if ticks == TIME_IMMEDIATE {
            debug!("Zero wait timeout, not sleeping");
            owned_mutex(lock);
            return CvStatus::Timeout;
        }
        match self.suspend(lock, Some(ticks)) {
            WakeMsg::Timeout => {
                debug!(ticks, "Condition wait timed out");
                CvStatus::Timeout
            }
            WakeMsg::Ok | WakeMsg::Reset => CvStatus::NoTimeout,
        }
    }

    /// `wait` until an absolute deadline on the steady clock
    pub fn wait_until(&self, lock: &mut UniqueLock<'_, Mutex>, deadline: TimePoint) -> CvStatus {
        self.wait_for(lock, deadline.saturating_duration_since(SteadyClock::now()))
    }

    /// Wait until `predicate` holds
    pub fn wait_pred<F>(&self, lock: &mut UniqueLock<'_, Mutex>, mut predicate: F)
    where
        F: FnMut() -> bool,
    {
        while !predicate() {
            self.wait(lock);
        }
    }

    /// Wait up to `timeout` for `predicate` to hold; returns its final value
    ///
    /// Never gives up before `timeout` has fully elapsed.
    pub fn wait_for_pred<F>(
        &self,
        lock: &mut UniqueLock<'_, Mutex>,
        timeout: Duration,
        predicate: F,
    ) -> bool
    where
        F: FnMut() -> bool,
    {
        // The clock reads whole ticks, so the current instant may lie up to
        // one tick past `now()`
        let slack = Duration::from_micros(ticks_to_us(1));
        self.wait_until_pred(lock, SteadyClock::now() + timeout + slack, predicate)
    }

    /// Wait until `deadline` for `predicate` to hold; returns its final value
    pub fn wait_until_pred<F>(
        &self,
        lock: &mut UniqueLock<'_, Mutex>,
        deadline: TimePoint,
        mut predicate: F,
    ) -> bool
    where
        F: FnMut() -> bool,
    {
        while !predicate() {
            if self.wait_until(lock, deadline) == CvStatus::Timeout {
                return predicate();
            }
        }
        true
    }

    fn suspend(&self, lock: &UniqueLock<'_, Mutex>, timeout: Option<Ticks>) -> WakeMsg {
        let sem = owned_mutex(lock).native_handle();

        let mut guard = crate::kernel::lock();
        sem.signal_i(&mut guard);
        self.queue.prio_insert(&mut guard, current());
        let msg = match timeout {
            None => go_sleep_s(&mut guard, ThreadState::WaitingCondition),
            Some(ticks) => go_sleep_timeout_s(
                &mut guard,
                ThreadState::WaitingCondition,
                ticks,
                Some(&self.queue),
            ),
        };
        sem.wait_s(&mut guard);
        msg
    }
}

fn owned_mutex<'a>(lock: &UniqueLock<'a, Mutex>) -> &'a Mutex {
    match lock.mutex() {
        Some(mutex) if lock.owns_lock() => mutex,
        _ => halt("condition wait without owning the lock"),
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Condvar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = lock();
        f.debug_struct("Condvar")
            .field("waiters", &self.queue.len(&guard))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_notify_without_waiters_is_noop() {
        let cv = Condvar::new();
        cv.notify_one();
        cv.notify_all();
    }

    #[test]
    fn test_zero_timeout_keeps_lock() {
        let mutex = Mutex::new();
        let cv = Condvar::new();
        let mut guard = UniqueLock::new(&mutex);

        assert_eq!(cv.wait_for(&mut guard, Duration::ZERO), CvStatus::Timeout);
        assert!(guard.owns_lock());
        assert!(!mutex.try_lock());
    }

    #[test]
    fn test_timeout_reacquires() {
        let mutex = Mutex::new();
        let cv = Condvar::new();
        let mut guard = UniqueLock::new(&mutex);

        let start = Instant::now();
        assert_eq!(cv.wait_for(&mut guard, Duration::from_millis(20)), CvStatus::Timeout);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(guard.owns_lock());
        assert!(!mutex.try_lock());
        assert_eq!(format!("{:?}", cv), "Condvar { waiters: 0 }");
    }

    #[test]
    fn test_predicate_wait_sees_flag() {
        let shared = Arc::new((Mutex::new(), Condvar::new(), AtomicBool::new(false)));

        let setter = shared.clone();
        let handle = thread::spawn(move || {
            let (mutex, cv, flag) = &*setter;
            thread::sleep(Duration::from_millis(10));
            let _guard = UniqueLock::new(mutex);
            flag.store(true, Ordering::Relaxed);
            cv.notify_one();
        });

        let (mutex, cv, flag) = &*shared;
        let mut guard = UniqueLock::new(mutex);
        assert!(cv.wait_for_pred(&mut guard, Duration::from_secs(5), || flag.load(Ordering::Relaxed)));
        drop(guard);
        handle.join().unwrap();
    }

    #[test]
    fn test_timed_predicate_reports_false() {
        let mutex = Mutex::new();
        let cv = Condvar::new();
        let mut guard = UniqueLock::new(&mutex);
        assert!(!cv.wait_for_pred(&mut guard, Duration::from_millis(10), || false));
        assert!(guard.owns_lock());
        assert!(cv.wait_until_pred(&mut guard, SteadyClock::now(), || true));
    }
}
