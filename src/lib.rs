/*!
 * rtos-std
 * Standard-library-shaped concurrency over a single-CPU priority RTOS kernel
 *
 * - `sync`: `Mutex`, `TimedMutex`, `UniqueLock`, `Condvar`
 * - `thread`: `Thread`, `Builder`, `this_thread`
 * - `chrono`: `SteadyClock`, `TimePoint`
 * - `kernel`: the primitive interface underneath, with its hosted port
 */

pub mod chrono;
pub mod core;
pub mod kernel;
pub mod monitoring;
pub mod sync;
pub mod thread;

// Re-exports
pub use chrono::{HighResolutionClock, SteadyClock, TimePoint};
pub use crate::core::{ConfigError, Priority, SpawnError, Ticks};
pub use kernel::{set_halt_hook, KernelConfig};
pub use monitoring::init_tracing;
pub use sync::{Condvar, CvStatus, Mutex, RawLock, RawTimedLock, TimedMutex, UniqueLock};
pub use thread::{this_thread, Builder, Thread};
