/*!
 * Lock Traits
 *
 * The lockable surface `UniqueLock` is generic over.
 */

use crate::chrono::TimePoint;
use std::time::Duration;

/// A lock with a single binary slot and no owner tracking
///
/// `unlock` must only be called by the party that holds the slot; this is not
/// checked here. `UniqueLock` is the checked way to hold one.
pub trait RawLock {
    /// Block until the slot is claimed
    fn lock(&self);

    /// Claim the slot only if it is free right now
    fn try_lock(&self) -> bool;

    /// Hand the slot to the next waiter, or mark it free
    fn unlock(&self);
}

/// A lock that can wait for a bounded time
///
/// A zero or past bound is a plain `try_lock`.
pub trait RawTimedLock: RawLock {
    fn try_lock_for(&self, timeout: Duration) -> bool;

    fn try_lock_until(&self, deadline: TimePoint) -> bool;
}
