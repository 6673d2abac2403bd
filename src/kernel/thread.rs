/*!
 * Kernel Threads
 *
 * Thread control blocks and lifecycle primitives: create, exit, wait for the
 * terminal state, query self. On the hosted port every kernel thread is backed
 * by an OS thread; reference counting (`ThreadRef`) stands in for the kernel's
 * release counter, so dropping the last reference reclaims the block.
 */

use super::config::config;
use super::halt::halt;
use super::queue::ThreadsQueue;
use super::sched::{go_sleep_s, ready_i, ThreadState, WakeMsg};
use super::syslock::{lock, SysCell, SysGuard};
use crate::core::limits::ADOPTED_THREAD_NAME;
use crate::core::types::Priority;
use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroU64;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: RefCell<Option<ThreadRef>> = const { RefCell::new(None) };
}

/// Opaque thread identity, only meaningful for equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(NonZeroU64);

impl ThreadId {
    fn next() -> Self {
        let raw = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        // Starts at 1 and a u64 counter does not wrap in practice
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn as_u64(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Scheduler-owned part of a thread control block
pub(super) struct SchedState {
    pub(super) state: ThreadState,
    pub(super) wake_msg: WakeMsg,
}

/// Thread control block
pub struct ThreadControl {
    id: ThreadId,
    name: String,
    // Written under the system lock, read lock-free while ordering wait queues
    priority: AtomicU8,
    pub(super) sched: SysCell<SchedState>,
    /// Threads blocked in `wait_exit` on this thread
    waiting: ThreadsQueue,
}

impl ThreadControl {
    fn new(name: String, priority: Priority, state: ThreadState) -> Self {
        Self {
            id: ThreadId::next(),
            name,
            priority: AtomicU8::new(priority.get()),
            sched: SysCell::new(SchedState {
                state,
                wake_msg: WakeMsg::Ok,
            }),
            waiting: ThreadsQueue::new(),
        }
    }

    /// A control block not backed by a launched context
    pub(crate) fn detached(name: &str, priority: Priority) -> ThreadRef {
        ThreadRef(Arc::new(Self::new(name.to_string(), priority, ThreadState::Current)))
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> Priority {
        // Only valid priorities are ever stored
        Priority::new(self.priority.load(Ordering::Relaxed)).unwrap_or(Priority::LOW)
    }

    pub fn state(&self, guard: &SysGuard) -> ThreadState {
        self.sched.get(guard).state
    }
}

/// Counted reference to a thread control block
///
/// Equality is identity of the control block.
#[derive(Clone)]
pub struct ThreadRef(Arc<ThreadControl>);

impl ThreadRef {
    /// Key under which this thread parks on the host
    pub(super) fn park_key(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Whether the thread has reached its terminal state
    pub fn is_final(&self) -> bool {
        let guard = lock();
        self.state(&guard) == ThreadState::Final
    }

    /// Drop this reference; the block is reclaimed with the last one
    pub fn release(self) {
        drop(self);
    }
}

impl std::ops::Deref for ThreadRef {
    type Target = ThreadControl;

    fn deref(&self) -> &ThreadControl {
        &self.0
    }
}

impl PartialEq for ThreadRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ThreadRef {}

impl fmt::Debug for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadRef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority())
            .finish()
    }
}

/// Creation parameters for a kernel thread
#[derive(Debug, Clone)]
pub struct ThreadParams {
    pub name: String,
    pub priority: Priority,
    pub stack_size: usize,
}

impl Default for ThreadParams {
    fn default() -> Self {
        let config = config();
        Self {
            name: String::new(),
            priority: config.default_priority,
            stack_size: config.default_stack_size,
        }
    }
}

/// Create a thread running `entry`
///
/// The returned reference is owned by the caller; the running context holds
/// its own.
pub fn create(
    params: ThreadParams,
    entry: Box<dyn FnOnce() + Send + 'static>,
) -> std::io::Result<ThreadRef> {
    let tcb = ThreadRef(Arc::new(ThreadControl::new(
        params.name.clone(),
        params.priority,
        ThreadState::Ready,
    )));
    let context = tcb.clone();

    let mut builder = std::thread::Builder::new().stack_size(config().host_stack(params.stack_size));
    if !params.name.is_empty() {
        builder = builder.name(params.name);
    }
    // The OS join handle is dropped: kernel threads are joined via `wait_exit`
    builder.spawn(move || run(context, entry))?;

    debug!(id = %tcb.id, priority = %tcb.priority(), "Thread created");
    Ok(tcb)
}

fn run(me: ThreadRef, entry: Box<dyn FnOnce() + Send + 'static>) {
    CURRENT.with(|current| *current.borrow_mut() = Some(me.clone()));
    {
        let mut guard = lock();
        me.sched.get_mut(&mut guard).state = ThreadState::Current;
    }

    if panic::catch_unwind(AssertUnwindSafe(entry)).is_err() {
        warn!(id = %me.id, "Thread body panicked");
    }

    let mut guard = lock();
    exit_s(&mut guard, &me);
}

/// Enter the terminal state and wake every joiner
fn exit_s(guard: &mut SysGuard, me: &ThreadRef) {
    me.sched.get_mut(guard).state = ThreadState::Final;
    while let Some(joiner) = me.waiting.fifo_remove(guard) {
        ready_i(guard, &joiner, WakeMsg::Ok);
    }
    debug!(id = %me.id, "Thread exited");
}

/// Block until `target` reaches its terminal state
pub fn wait_exit(target: &ThreadRef) {
    let me = current();
    if &me == target {
        halt("thread waiting on itself");
    }

    let mut guard = lock();
    if target.state(&guard) != ThreadState::Final {
        target.waiting.prio_insert(&mut guard, me);
        go_sleep_s(&mut guard, ThreadState::WaitingExit);
    }
}

/// The calling thread's control block
///
/// Threads the kernel did not launch are adopted on first use at the
/// configured default priority.
pub fn current() -> ThreadRef {
    CURRENT.with(|current| {
        current
            .borrow_mut()
            .get_or_insert_with(|| {
                let name = std::thread::current()
                    .name()
                    .unwrap_or(ADOPTED_THREAD_NAME)
                    .to_string();
                let tcb = ThreadControl::detached(&name, config().default_priority);
                debug!(id = %tcb.id, name = %tcb.name, "Adopted host thread");
                tcb
            })
            .clone()
    })
}

/// Change the calling thread's priority, returning the previous one
pub fn set_priority(priority: Priority) -> Priority {
    let me = current();
    let _guard = lock();
    let old = me.priority.swap(priority.get(), Ordering::Relaxed);
    Priority::new(old).unwrap_or(Priority::LOW)
}
