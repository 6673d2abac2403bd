/*!
 * Scheduler Primitives
 *
 * Sleep/ready transitions for the calling thread, all entered with the system
 * lock held.
 *
 * # Design: Parking on the Control Block
 *
 * A sleeping thread parks (parking_lot_core) on the address of its own control
 * block. The state written under the system lock is the source of truth:
 * - The sleeper re-checks its state in the park validation callback, so a
 *   ready issued before it parks is never lost
 * - The system lock is handed back only after the thread is in the park queue
 * - Wakers unpark while still holding the system lock, so an unpark can never
 *   leak into a later, unrelated sleep
 *
 * On timeout the sleeper itself plays the kernel's timer callback: it retakes
 * the system lock and, only if no waker readied it in the meantime, removes
 * itself from the wait queue. A queued thread is therefore removed exactly
 * once, by a waker or by expiry.
 */

use super::syslock::{lock, SysGuard};
use super::thread::{current, ThreadRef};
use super::time::host_deadline;
use super::queue::ThreadsQueue;
use crate::core::limits::{TIME_IMMEDIATE, TIME_INFINITE};
use crate::core::types::Ticks;
use parking_lot_core::{park, unpark_one, ParkResult, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::time::Instant;

/// Scheduling state of a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Runnable, not yet dispatched
    Ready,
    /// Running
    Current,
    /// Blocked on a semaphore
    WaitingSemaphore,
    /// Blocked on a condition variable
    WaitingCondition,
    /// Sleeping for a fixed interval
    Sleeping,
    /// Blocked until another thread terminates
    WaitingExit,
    /// Terminated
    Final,
}

impl ThreadState {
    pub fn is_sleeping(self) -> bool {
        !matches!(self, Self::Ready | Self::Current | Self::Final)
    }
}

/// Reason a sleeping thread was woken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeMsg {
    /// Signaled by a waker
    Ok,
    /// Deadline expired
    Timeout,
    /// Object reset or broadcast
    Reset,
}

/// Put the calling thread to sleep until readied
pub fn go_sleep_s(guard: &mut SysGuard, state: ThreadState) -> WakeMsg {
    go_sleep_timeout_s(guard, state, TIME_INFINITE, None)
}

/// Put the calling thread to sleep until readied or `timeout` ticks elapse
///
/// On expiry the thread removes itself from `queue` (if given) and reports
/// `WakeMsg::Timeout`. `TIME_IMMEDIATE` expires without sleeping.
pub fn go_sleep_timeout_s(
    guard: &mut SysGuard,
    state: ThreadState,
    timeout: Ticks,
    queue: Option<&ThreadsQueue>,
) -> WakeMsg {
    debug_assert!(state.is_sleeping());
    let me = current();

    if timeout == TIME_IMMEDIATE {
        return expire(guard, &me, queue);
    }

    me.sched.get_mut(guard).state = state;
    let deadline = host_deadline(timeout);
    let key = me.park_key();

    loop {
        let result = {
            let shared: &SysGuard = guard;
            let validate = || me.sched.get(shared).state == state;
            // SAFETY: no SysCell borrow outlives `validate`, and the lock is
            // retaken below before the guard is used again
            let before_sleep = || unsafe { shared.suspend() };
            // SAFETY: the key is the address of our own live control block
            unsafe {
                park(
                    key,
                    validate,
                    before_sleep,
                    |_, _| {},
                    DEFAULT_PARK_TOKEN,
                    deadline,
                )
            }
        };
        if result != ParkResult::Invalid {
            guard.reacquire();
        }

        let sched = me.sched.get_mut(guard);
        if sched.state != state {
            sched.state = ThreadState::Current;
            return sched.wake_msg;
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return expire(guard, &me, queue);
        }
        // Spurious unpark: still queued, sleep again
    }
}

fn expire(guard: &mut SysGuard, me: &ThreadRef, queue: Option<&ThreadsQueue>) -> WakeMsg {
    if let Some(queue) = queue {
        queue.dequeue(guard, me);
    }
    let sched = me.sched.get_mut(guard);
    sched.state = ThreadState::Current;
    sched.wake_msg = WakeMsg::Timeout;
    WakeMsg::Timeout
}

/// Make a sleeping thread runnable with the given wake reason
///
/// The caller must already have removed it from whatever queue it sat on.
pub fn ready_i(guard: &mut SysGuard, thread: &ThreadRef, msg: WakeMsg) {
    let sched = thread.sched.get_mut(guard);
    debug_assert!(sched.state.is_sleeping());
    sched.state = ThreadState::Ready;
    sched.wake_msg = msg;
    // SAFETY: the key is the address of a control block kept alive by `thread`
    unsafe {
        unpark_one(thread.park_key(), |_| DEFAULT_UNPARK_TOKEN);
    }
}

/// Wake a thread; the caller keeps running
pub fn wakeup_s(guard: &mut SysGuard, thread: &ThreadRef, msg: WakeMsg) {
    ready_i(guard, thread, msg);
}

/// Reschedule point: yields once the system lock is released
pub fn reschedule_s(guard: &mut SysGuard) {
    guard.request_reschedule();
}

/// Suspend the calling thread for `ticks` system ticks
pub fn sleep(ticks: Ticks) {
    let mut guard = lock();
    go_sleep_timeout_s(&mut guard, ThreadState::Sleeping, ticks, None);
}

/// Offer the CPU to other ready threads
pub fn yield_now() {
    let mut guard = lock();
    reschedule_s(&mut guard);
}
