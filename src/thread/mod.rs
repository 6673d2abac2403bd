/*!
 * Threads
 *
 * `Thread` is an exclusive, movable handle over one kernel thread. A bound
 * handle must be joined to completion or detached before it is dropped;
 * dropping a handle whose thread is still running halts the kernel.
 *
 * Spawning blocks until the new thread has taken ownership of its body.
 */

pub mod this_thread;

use crate::core::errors::{ConfigError, SpawnError};
use crate::core::limits::{HARDWARE_CONCURRENCY, MIN_STACK_SIZE};
use crate::core::types::Priority;
use crate::kernel::{self, halt, Semaphore, ThreadId, ThreadParams, ThreadRef};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Handle over a kernel thread
#[derive(Default)]
pub struct Thread {
    handle: Option<ThreadRef>,
}

impl Thread {
    /// Launch `body` with the configured default name, priority and stack
    ///
    /// Halts if the kernel cannot create the thread; use `Builder` to handle
    /// that case.
    pub fn spawn<F>(body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        match Builder::new().spawn(body) {
            Ok(thread) => thread,
            Err(_) => halt("thread creation failed"),
        }
    }

    /// Whether this handle is bound to a thread
    pub fn joinable(&self) -> bool {
        self.handle.is_some()
    }

    /// Block until the thread terminates
    ///
    /// The handle stays bound; dropping it afterwards releases the thread.
    /// Halts on an unbound handle or when a thread joins itself.
    pub fn join(&self) {
        match &self.handle {
            Some(handle) => kernel::wait_exit(handle),
            None => halt("join on an unbound thread handle"),
        }
    }

    /// Let the thread run on unsupervised and unbind this handle
    pub fn detach(&mut self) {
        match self.handle.take() {
            Some(handle) => {
                debug!(id = %handle.id(), "Thread detached");
                handle.release();
            }
            None => halt("detach of an unbound thread handle"),
        }
    }

    pub fn id(&self) -> Option<ThreadId> {
        self.handle.as_ref().map(|handle| handle.id())
    }

    /// The kernel thread behind this handle
    pub fn native_handle(&self) -> Option<&ThreadRef> {
        self.handle.as_ref()
    }

    pub fn swap(&mut self, other: &mut Thread) {
        std::mem::swap(&mut self.handle, &mut other.handle);
    }

    pub const fn hardware_concurrency() -> usize {
        HARDWARE_CONCURRENCY
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_final() {
                halt("thread handle dropped while the thread is running");
            }
            handle.release();
        }
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread").field("id", &self.id()).finish()
    }
}

/// Thread factory with explicit name, priority and stack budget
///
/// Unset fields take the kernel configuration defaults.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    name: Option<String>,
    priority: Option<Priority>,
    stack_size: Option<usize>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Launch `body`, returning once the new thread owns it
    pub fn spawn<F>(self, body: F) -> Result<Thread, SpawnError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut params = ThreadParams::default();
        if let Some(name) = self.name {
            params.name = name;
        }
        if let Some(priority) = self.priority {
            params.priority = priority;
        }
        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(ConfigError::InvalidStackSize(size).into());
            }
            params.stack_size = size;
        }

        let started = Arc::new(Semaphore::new(0));
        let signal = started.clone();
        let entry = Box::new(move || {
            signal.signal();
            body();
        });

        let name = params.name.clone();
        let handle = kernel::create(params, entry).map_err(|source| SpawnError::Host { name, source })?;
        started.wait();

        Ok(Thread {
            handle: Some(handle),
        })
    }
}
