/*!
 * System Time
 *
 * Monotonic tick counter and tick/microsecond conversions. Conversions round
 * up so that a timeout never expires early.
 */

use super::config::config;
use crate::core::limits::{MICROS_PER_SEC, TIME_INFINITE};
use crate::core::types::Ticks;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static BOOT: OnceLock<Instant> = OnceLock::new();

fn boot_instant() -> Instant {
    *BOOT.get_or_init(Instant::now)
}

/// Ticks elapsed since the kernel time base started
pub fn system_time() -> Ticks {
    let elapsed = boot_instant().elapsed();
    elapsed_to_ticks(elapsed, config().tick_frequency)
}

fn elapsed_to_ticks(elapsed: Duration, frequency: u32) -> Ticks {
    // Truncate: the counter only advances on whole ticks
    let ticks = elapsed.as_micros() * frequency as u128 / MICROS_PER_SEC as u128;
    ticks.min(TIME_INFINITE as u128 - 1) as Ticks
}

/// Microseconds to ticks, rounding up; finite inputs never map to `TIME_INFINITE`
pub fn us_to_ticks(micros: u64) -> Ticks {
    us_to_ticks_at(micros, config().tick_frequency)
}

/// Ticks to microseconds, rounding up
pub fn ticks_to_us(ticks: Ticks) -> u64 {
    ticks_to_us_at(ticks, config().tick_frequency)
}

pub(crate) fn us_to_ticks_at(micros: u64, frequency: u32) -> Ticks {
    let ticks = (micros as u128 * frequency as u128).div_ceil(MICROS_PER_SEC as u128);
    ticks.min(TIME_INFINITE as u128 - 1) as Ticks
}

pub(crate) fn ticks_to_us_at(ticks: Ticks, frequency: u32) -> u64 {
    let micros = (ticks as u128 * MICROS_PER_SEC as u128).div_ceil(frequency as u128);
    micros.min(u64::MAX as u128) as u64
}

/// Timeout in ticks for a relative duration
pub fn duration_to_ticks(duration: Duration) -> Ticks {
    us_to_ticks(duration.as_micros().min(u64::MAX as u128) as u64)
}

/// Host deadline for a tick timeout starting now
pub(super) fn host_deadline(ticks: Ticks) -> Option<Instant> {
    if ticks == TIME_INFINITE {
        return None;
    }
    Instant::now().checked_add(Duration::from_micros(ticks_to_us(ticks)))
}
