/*!
 * Unique Lock
 *
 * Scoped guard that holds at most one lock on one mutex. The binding and the
 * ownership flag always change together; dropping the guard unlocks iff it
 * owns. Acquiring through a guard that already owns, or releasing through one
 * that does not, halts.
 */

use super::mutex::Mutex;
use super::traits::{RawLock, RawTimedLock};
use crate::chrono::TimePoint;
use crate::kernel::halt;
use std::fmt;
use std::time::Duration;

/// Movable lock guard over a `RawLock`
#[must_use = "dropping the guard releases the lock immediately"]
pub struct UniqueLock<'a, M: RawLock = Mutex> {
    device: Option<&'a M>,
    owns: bool,
}

impl<'a, M: RawLock> UniqueLock<'a, M> {
    /// Bind to `mutex` and block until it is locked
    pub fn new(mutex: &'a M) -> Self {
        mutex.lock();
        Self {
            device: Some(mutex),
            owns: true,
        }
    }

    /// Bind to `mutex` without locking it
    pub fn deferred(mutex: &'a M) -> Self {
        Self {
            device: Some(mutex),
            owns: false,
        }
    }

    /// Bind to `mutex` and try once to lock it
    pub fn try_new(mutex: &'a M) -> Self {
        let owns = mutex.try_lock();
        Self {
            device: Some(mutex),
            owns,
        }
    }

    /// Bind to a `mutex` the caller has already locked
    ///
    /// The caller's claim is taken on trust.
    pub fn adopt(mutex: &'a M) -> Self {
        Self {
            device: Some(mutex),
            owns: true,
        }
    }

    pub fn lock(&mut self) {
        self.acquirable().lock();
        self.owns = true;
    }

    pub fn try_lock(&mut self) -> bool {
        self.owns = self.acquirable().try_lock();
        self.owns
    }

    pub fn unlock(&mut self) {
        match self.device {
            Some(mutex) if self.owns => {
                mutex.unlock();
                self.owns = false;
            }
            Some(_) => halt("unlock through a guard that does not own its mutex"),
            None => halt("unlock through an unbound guard"),
        }
    }

    /// Detach from the mutex without unlocking it
    ///
    /// The guard is left unbound; if it owned the lock, the caller now does.
    pub fn release(&mut self) -> Option<&'a M> {
        self.owns = false;
        self.device.take()
    }

    pub fn owns_lock(&self) -> bool {
        self.owns
    }

    /// Same as `owns_lock`
    pub fn is_locked(&self) -> bool {
        self.owns
    }

    pub fn mutex(&self) -> Option<&'a M> {
        self.device
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    fn acquirable(&self) -> &'a M {
        match self.device {
            Some(_) if self.owns => halt("lock through a guard that already owns its mutex"),
            Some(mutex) => mutex,
            None => halt("lock through an unbound guard"),
        }
    }
}

impl<'a, M: RawTimedLock> UniqueLock<'a, M> {
    /// Bind to `mutex` and wait up to `timeout` to lock it
    pub fn try_for(mutex: &'a M, timeout: Duration) -> Self {
        let owns = mutex.try_lock_for(timeout);
        Self {
            device: Some(mutex),
            owns,
        }
    }

    /// Bind to `mutex` and wait until `deadline` to lock it
    pub fn try_until(mutex: &'a M, deadline: TimePoint) -> Self {
        let owns = mutex.try_lock_until(deadline);
        Self {
            device: Some(mutex),
            owns,
        }
    }

    pub fn try_lock_for(&mut self, timeout: Duration) -> bool {
        self.owns = self.acquirable().try_lock_for(timeout);
        self.owns
    }

    pub fn try_lock_until(&mut self, deadline: TimePoint) -> bool {
        self.owns = self.acquirable().try_lock_until(deadline);
        self.owns
    }
}

impl<M: RawLock> Default for UniqueLock<'_, M> {
    /// An unbound, non-owning guard
    fn default() -> Self {
        Self {
            device: None,
            owns: false,
        }
    }
}

impl<M: RawLock> Drop for UniqueLock<'_, M> {
    fn drop(&mut self) {
        if self.owns {
            if let Some(mutex) = self.device {
                mutex.unlock();
            }
        }
    }
}

impl<M: RawLock> fmt::Debug for UniqueLock<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueLock")
            .field("bound", &self.device.is_some())
            .field("owns", &self.owns)
            .finish()
    }
}
