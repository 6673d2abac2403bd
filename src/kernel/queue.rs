/*!
 * Threads Queue
 *
 * Wait list of thread references owned by a semaphore, a condition variable
 * or a thread being joined. Mutated only under the system lock.
 */

use super::syslock::{SysCell, SysGuard};
use super::thread::ThreadRef;
use std::collections::VecDeque;

/// Wait list of blocked threads
pub struct ThreadsQueue {
    threads: SysCell<VecDeque<ThreadRef>>,
}

impl ThreadsQueue {
    pub const fn new() -> Self {
        Self {
            threads: SysCell::new(VecDeque::new()),
        }
    }

    /// Insert behind every thread of higher or equal priority
    ///
    /// Equal priorities keep arrival order, so the queue is FIFO within a
    /// priority level.
    pub fn prio_insert(&self, guard: &mut SysGuard, thread: ThreadRef) {
        let threads = self.threads.get_mut(guard);
        let priority = thread.priority();
        let pos = threads
            .iter()
            .position(|queued| queued.priority() < priority)
            .unwrap_or(threads.len());
        threads.insert(pos, thread);
    }

    /// Append at the tail regardless of priority
    pub fn fifo_insert(&self, guard: &mut SysGuard, thread: ThreadRef) {
        self.threads.get_mut(guard).push_back(thread);
    }

    /// Remove the head of the queue
    #[inline]
    pub fn fifo_remove(&self, guard: &mut SysGuard) -> Option<ThreadRef> {
        self.threads.get_mut(guard).pop_front()
    }

    /// Remove a specific thread; returns `false` if it was not queued
    pub fn dequeue(&self, guard: &mut SysGuard, thread: &ThreadRef) -> bool {
        let threads = self.threads.get_mut(guard);
        match threads.iter().position(|queued| queued == thread) {
            Some(pos) => {
                threads.remove(pos);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_empty(&self, guard: &SysGuard) -> bool {
        self.threads.get(guard).is_empty()
    }

    #[inline]
    pub fn len(&self, guard: &SysGuard) -> usize {
        self.threads.get(guard).len()
    }
}

impl Default for ThreadsQueue {
    fn default() -> Self {
        Self::new()
    }
}
