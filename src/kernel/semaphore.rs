/*!
 * Counting Semaphore
 *
 * Kernel counting semaphore. A negative count is the number of waiting
 * threads; waiters are served in arrival order.
 *
 * The `_s` variants expect the system lock to be held by the caller, the
 * `_i` variants additionally never reschedule, so they compose with other
 * locked operations (the condition variable relies on this).
 */

use super::queue::ThreadsQueue;
use super::sched::{go_sleep_s, go_sleep_timeout_s, ready_i, ThreadState, WakeMsg};
use super::syslock::{lock, SysCell, SysGuard};
use super::thread::current;
use crate::core::types::Ticks;

/// Counting semaphore
pub struct Semaphore {
    count: SysCell<isize>,
    queue: ThreadsQueue,
}

impl Semaphore {
    pub const fn new(count: isize) -> Self {
        Self {
            count: SysCell::new(count),
            queue: ThreadsQueue::new(),
        }
    }

    /// Take one unit, blocking while none is available
    pub fn wait(&self) -> WakeMsg {
        let mut guard = lock();
        self.wait_s(&mut guard)
    }

    /// Take one unit, giving up after `timeout` ticks
    ///
    /// `TIME_IMMEDIATE` makes this a non-blocking attempt.
    pub fn wait_timeout(&self, timeout: Ticks) -> WakeMsg {
        let mut guard = lock();
        self.wait_timeout_s(&mut guard, timeout)
    }

    /// Release one unit, waking the oldest waiter if any
    pub fn signal(&self) {
        let mut guard = lock();
        if self.signal_i(&mut guard) {
            guard.request_reschedule();
        }
    }

    pub fn wait_s(&self, guard: &mut SysGuard) -> WakeMsg {
        let count = self.count.get_mut(guard);
        *count -= 1;
        if *count >= 0 {
            return WakeMsg::Ok;
        }
        self.queue.fifo_insert(guard, current());
        go_sleep_s(guard, ThreadState::WaitingSemaphore)
    }

    pub fn wait_timeout_s(&self, guard: &mut SysGuard, timeout: Ticks) -> WakeMsg {
        let count = self.count.get_mut(guard);
        if *count > 0 {
            *count -= 1;
            return WakeMsg::Ok;
        }
        *count -= 1;
        self.queue.fifo_insert(guard, current());
        let msg = go_sleep_timeout_s(
            guard,
            ThreadState::WaitingSemaphore,
            timeout,
            Some(&self.queue),
        );
        if msg == WakeMsg::Timeout {
            // Expiry already dequeued us; give back the reserved slot
            *self.count.get_mut(guard) += 1;
        }
        msg
    }

    /// Release one unit; returns whether a waiter was readied
    pub fn signal_i(&self, guard: &mut SysGuard) -> bool {
        let count = self.count.get_mut(guard);
        *count += 1;
        if *count > 0 {
            return false;
        }
        match self.queue.fifo_remove(guard) {
            Some(waiter) => {
                ready_i(guard, &waiter, WakeMsg::Ok);
                true
            }
            None => false,
        }
    }

    /// Current count; negative values count the waiters
    pub fn count(&self) -> isize {
        let guard = lock();
        *self.count.get(&guard)
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new(0)
    }
}
