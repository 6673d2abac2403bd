/*!
 * Current Thread
 *
 * Operations on the calling thread.
 */

use crate::chrono::{SteadyClock, TimePoint};
use crate::core::types::Priority;
use crate::kernel::{self, duration_to_ticks, ThreadId};
use std::time::Duration;

/// Give other ready threads a chance to run
pub fn yield_now() {
    kernel::yield_now();
}

/// Sleep for at least `duration`, rounded up to whole ticks
pub fn sleep_for(duration: Duration) {
    kernel::sleep(duration_to_ticks(duration));
}

/// Sleep until `deadline`; returns at once if it has passed
pub fn sleep_until(deadline: TimePoint) {
    sleep_for(deadline.saturating_duration_since(SteadyClock::now()));
}

pub fn id() -> ThreadId {
    kernel::current().id()
}

pub fn priority() -> Priority {
    kernel::current().priority()
}

/// Change the calling thread's priority, returning the previous one
pub fn set_priority(priority: Priority) -> Priority {
    kernel::set_priority(priority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_sleep_for_waits() {
        let start = Instant::now();
        sleep_for(Duration::from_millis(10));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_sleep_until_past_returns() {
        let start = Instant::now();
        sleep_until(SteadyClock::now() - Duration::from_secs(1));
        yield_now();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_id_is_stable_and_distinct() {
        let mine = id();
        assert_eq!(mine, id());
        let other = std::thread::spawn(id).join().unwrap();
        assert_ne!(mine, other);
    }
}
