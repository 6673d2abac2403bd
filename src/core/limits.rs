/*!
 * System Limits and Constants
 *
 * Centralized location for kernel-wide limits, priorities and timing constants.
 * Organized by domain for maintainability and discoverability.
 *
 * ## Conventions
 * - Values mirror the defaults of a small single-CPU RTOS build
 * - Host-only values (stack floors for OS threads) are marked with [HOST]
 * - Performance-relevant values are marked with [PERF]
 */

// =============================================================================
// PRIORITIES
// =============================================================================

/// Reserved for the idle thread, never handed to application threads
pub const IDLE_PRIORITY: u8 = 0;

/// Lowest priority usable by application threads
pub const LOW_PRIORITY: u8 = 1;

/// Default priority for threads launched without an explicit one
pub const NORMAL_PRIORITY: u8 = 128;

/// Highest priority usable by application threads
pub const HIGH_PRIORITY: u8 = 255;

// =============================================================================
// THREADS
// =============================================================================

/// Stack budget requested for every thread launched with defaults (256 bytes)
pub const DEFAULT_STACK_SIZE: usize = 256;

/// Smallest stack budget accepted for a kernel thread
pub const MIN_STACK_SIZE: usize = 64;

/// Smallest stack the hosted port will hand to an OS thread (64KB)
/// [HOST] Kernel stack budgets are far below what a host thread needs
pub const HOST_MIN_STACK_SIZE: usize = 64 * 1024;

/// Number of CPUs the kernel schedules on
pub const HARDWARE_CONCURRENCY: usize = 1;

/// Name given to threads adopted by the kernel instead of launched by it
pub const ADOPTED_THREAD_NAME: &str = "main";

// =============================================================================
// TIME
// =============================================================================

/// System tick frequency (10kHz, 100us per tick)
pub const DEFAULT_TICK_FREQUENCY: u32 = 10_000;

/// High resolution tick frequency (1MHz, 1us per tick)
/// [PERF] Finer timeouts at the cost of more timer work per second
pub const HIGH_RES_TICK_FREQUENCY: u32 = 1_000_000;

/// Microseconds per second
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Timeout value meaning "do not wait at all"
pub const TIME_IMMEDIATE: u64 = 0;

/// Timeout value meaning "wait forever"
pub const TIME_INFINITE: u64 = u64::MAX;
