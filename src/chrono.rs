/*!
 * Clocks
 *
 * Monotonic clock over the kernel tick counter, read in microseconds.
 * Resolution is one system tick.
 */

use crate::kernel::time::{system_time, ticks_to_us};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::Duration;

/// Monotonic system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SteadyClock;

/// The steady clock is also the finest clock the kernel offers
pub type HighResolutionClock = SteadyClock;

impl SteadyClock {
    /// Readings never decrease
    pub const IS_STEADY: bool = true;

    pub fn now() -> TimePoint {
        TimePoint::from_micros(ticks_to_us(system_time()))
    }
}

/// Instant on the steady clock, in microseconds since the kernel time base
///
/// Arithmetic saturates instead of wrapping or panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TimePoint {
    micros: u64,
}

impl TimePoint {
    pub const fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    pub const fn as_micros(self) -> u64 {
        self.micros
    }

    /// Time from `earlier` to `self`, zero if `earlier` is later
    pub fn saturating_duration_since(self, earlier: TimePoint) -> Duration {
        Duration::from_micros(self.micros.saturating_sub(earlier.micros))
    }

    /// Time elapsed since this point
    pub fn elapsed(self) -> Duration {
        SteadyClock::now().saturating_duration_since(self)
    }
}

fn duration_micros(duration: Duration) -> u64 {
    duration.as_micros().min(u64::MAX as u128) as u64
}

impl Add<Duration> for TimePoint {
    type Output = TimePoint;

    fn add(self, rhs: Duration) -> TimePoint {
        TimePoint::from_micros(self.micros.saturating_add(duration_micros(rhs)))
    }
}

impl AddAssign<Duration> for TimePoint {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub<Duration> for TimePoint {
    type Output = TimePoint;

    fn sub(self, rhs: Duration) -> TimePoint {
        TimePoint::from_micros(self.micros.saturating_sub(duration_micros(rhs)))
    }
}

impl SubAssign<Duration> for TimePoint {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl Sub for TimePoint {
    type Output = Duration;

    fn sub(self, rhs: TimePoint) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.micros)
    }
}
