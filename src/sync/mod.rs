/*!
 * Synchronization Primitives
 *
 * Standard-library-shaped locking over kernel primitives:
 * - `Mutex` / `TimedMutex`: binary locks over a capacity-one semaphore
 * - `UniqueLock`: scoped, movable guard owning at most one lock
 * - `Condvar`: priority-ordered condition variable for `Mutex`
 *
 * Contract violations (double lock through a guard, unlock without owning,
 * waiting without the lock) halt the kernel. Timeouts are plain return values.
 */

mod condvar;
mod mutex;
mod traits;
mod unique_lock;

pub use condvar::{CvStatus, Condvar};
pub use mutex::{Mutex, TimedMutex};
pub use traits::{RawLock, RawTimedLock};
pub use unique_lock::UniqueLock;
