/*!
 * Kernel Interface
 *
 * The primitive surface the synchronization layer is built on: the global
 * system lock, wait queues, counting semaphores, the sleep/ready scheduler
 * transitions, thread lifecycle, system time and halt.
 *
 * # Hosted Port
 *
 * This implementation runs the kernel model on a general-purpose host:
 * - Kernel threads are OS threads
 * - The system lock is a single `parking_lot` raw mutex
 * - Sleeping threads park on their control block (`parking_lot_core`)
 * - Wait-queue priority order is exact; CPU preemption by priority is left
 *   to the host scheduler
 *
 * Naming follows the classic RTOS convention: `_s` functions require the
 * system lock, `_i` functions additionally never reschedule.
 */

pub mod config;
pub mod halt;
pub mod queue;
pub mod sched;
pub mod semaphore;
pub mod syslock;
pub mod thread;
pub mod time;

pub use config::{config, init, KernelConfig};
pub use halt::{halt, set_halt_hook, HaltHook};
pub use queue::ThreadsQueue;
pub use sched::{
    go_sleep_s, go_sleep_timeout_s, ready_i, reschedule_s, sleep, wakeup_s, yield_now,
    ThreadState, WakeMsg,
};
pub use semaphore::Semaphore;
pub use syslock::{lock, SysCell, SysGuard};
pub use thread::{create, current, set_priority, wait_exit, ThreadControl, ThreadId, ThreadParams, ThreadRef};
pub use time::{duration_to_ticks, system_time, ticks_to_us, us_to_ticks};
