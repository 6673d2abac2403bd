/*!
 * Mutexes
 *
 * Binary locks over a kernel semaphore of capacity one. Acquirers queue on
 * the semaphore in arrival order. Neither type records its holder.
 * `TimedMutex` is a `Mutex` with bounded waits added on top.
 */

use super::traits::{RawLock, RawTimedLock};
use crate::chrono::{SteadyClock, TimePoint};
use crate::core::limits::TIME_IMMEDIATE;
use crate::kernel::semaphore::Semaphore;
use crate::kernel::time::duration_to_ticks;
use crate::kernel::WakeMsg;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Mutual exclusion lock
pub struct Mutex {
    sem: Semaphore,
}

impl Mutex {
    /// An unlocked mutex, usable in statics
    pub const fn new() -> Self {
        Self {
            sem: Semaphore::new(1),
        }
    }

    pub fn lock(&self) {
        self.sem.wait();
    }

    pub fn try_lock(&self) -> bool {
        self.sem.wait_timeout(TIME_IMMEDIATE) == WakeMsg::Ok
    }

    pub fn unlock(&self) {
        self.sem.signal();
    }

    /// The kernel semaphore backing this mutex
    pub fn native_handle(&self) -> &Semaphore {
        &self.sem
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex").field("count", &self.sem.count()).finish()
    }
}

impl RawLock for Mutex {
    fn lock(&self) {
        Mutex::lock(self)
    }

    fn try_lock(&self) -> bool {
        Mutex::try_lock(self)
    }

    fn unlock(&self) {
        Mutex::unlock(self)
    }
}

/// Mutex whose acquisition can give up after a bounded wait
pub struct TimedMutex {
    base: Mutex,
}

impl TimedMutex {
    pub const fn new() -> Self {
        Self { base: Mutex::new() }
    }

    pub fn lock(&self) {
        self.base.lock();
    }

    pub fn try_lock(&self) -> bool {
        self.base.try_lock()
    }

    /// Wait up to `timeout` for the lock; zero is a plain `try_lock`
    pub fn try_lock_for(&self, timeout: Duration) -> bool {
        let ticks = duration_to_ticks(timeout);
        if ticks == TIME_IMMEDIATE {
            debug!("Zero lock timeout, trying once");
        }
        self.native_handle().wait_timeout(ticks) == WakeMsg::Ok
    }

    /// Wait until `deadline` for the lock; a past deadline is a plain `try_lock`
    pub fn try_lock_until(&self, deadline: TimePoint) -> bool {
        self.try_lock_for(deadline.saturating_duration_since(SteadyClock::now()))
    }

    pub fn unlock(&self) {
        self.base.unlock();
    }

    pub fn native_handle(&self) -> &Semaphore {
        self.base.native_handle()
    }
}

impl Default for TimedMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimedMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedMutex")
            .field("count", &self.native_handle().count())
            .finish()
    }
}

impl RawLock for TimedMutex {
    fn lock(&self) {
        TimedMutex::lock(self)
    }

    fn try_lock(&self) -> bool {
        TimedMutex::try_lock(self)
    }

    fn unlock(&self) {
        TimedMutex::unlock(self)
    }
}

impl RawTimedLock for TimedMutex {
    fn try_lock_for(&self, timeout: Duration) -> bool {
        TimedMutex::try_lock_for(self, timeout)
    }

    fn try_lock_until(&self, deadline: TimePoint) -> bool {
        TimedMutex::try_lock_until(self, deadline)
    }
}
