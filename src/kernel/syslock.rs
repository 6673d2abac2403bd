/*!
 * System Lock
 *
 * The single global critical section serializing every scheduler-owned
 * structure: semaphore counts, wait queues and thread states.
 *
 * # Design
 *
 * - One raw lock for the whole kernel, never held across a blocking call
 *   (sleeping threads hand it back before parking)
 * - `SysGuard` is the proof of ownership; `SysCell` contents are only
 *   reachable through it, so the borrow checker enforces "lock held"
 * - Not re-entrant: locking twice from one thread halts
 */

use super::halt::halt;
use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;
use std::cell::{Cell, UnsafeCell};
use std::marker::PhantomData;

static SYS_LOCK: RawMutex = RawMutex::INIT;

thread_local! {
    static IN_SYS_LOCK: Cell<bool> = const { Cell::new(false) };
}

/// Enter the system-locked state
pub fn lock() -> SysGuard {
    if IN_SYS_LOCK.with(Cell::get) {
        halt("nested system lock");
    }
    SYS_LOCK.lock();
    IN_SYS_LOCK.with(|flag| flag.set(true));
    SysGuard {
        reschedule: false,
        _not_send: PhantomData,
    }
}

/// Ownership of the system lock
///
/// Released on drop. Deliberately `!Send`: the lock belongs to the thread
/// that took it.
pub struct SysGuard {
    reschedule: bool,
    _not_send: PhantomData<*const ()>,
}

impl SysGuard {
    /// Ask for a reschedule point once the lock is released
    #[inline]
    pub fn request_reschedule(&mut self) {
        self.reschedule = true;
    }

    /// Hand the lock back while this thread sleeps
    ///
    /// # Safety
    ///
    /// Must be paired with `reacquire` before the guard is used or dropped,
    /// and no `SysCell` borrow may be alive.
    pub(super) unsafe fn suspend(&self) {
        SYS_LOCK.unlock();
    }

    /// Take the lock again after `suspend`
    pub(super) fn reacquire(&self) {
        SYS_LOCK.lock();
    }
}

impl Drop for SysGuard {
    fn drop(&mut self) {
        IN_SYS_LOCK.with(|flag| flag.set(false));
        // SAFETY: a SysGuard only exists while this thread holds SYS_LOCK
        unsafe { SYS_LOCK.unlock() };
        if self.reschedule {
            std::thread::yield_now();
        }
    }
}

/// Kernel data that may only be touched under the system lock
pub struct SysCell<T> {
    value: UnsafeCell<T>,
}

// SAFETY: all access goes through a SysGuard, and only one SysGuard exists
// at a time across the whole process
unsafe impl<T: Send> Sync for SysCell<T> {}
unsafe impl<T: Send> Send for SysCell<T> {}

impl<T> SysCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    #[inline]
    pub fn get<'a>(&'a self, _guard: &'a SysGuard) -> &'a T {
        // SAFETY: the shared borrow of the guard excludes any `get_mut`
        unsafe { &*self.value.get() }
    }

    #[inline]
    pub fn get_mut<'a>(&'a self, _guard: &'a mut SysGuard) -> &'a mut T {
        // SAFETY: the exclusive borrow of the one live guard excludes every
        // other access to every SysCell
        unsafe { &mut *self.value.get() }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}
