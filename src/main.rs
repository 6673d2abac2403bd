/*!
 * rtos-std demo
 *
 * Bounded producer/consumer over one `Mutex` and two `Condvar`s:
 * - Producers wait on `not_full` while the buffer is at capacity
 * - Consumers wait on `not_empty` while it is empty
 * - A consumer takes the stop signal once every item has been consumed
 */

use rtos_std::kernel::{self, KernelConfig};
use rtos_std::{
    init_tracing, this_thread, Builder, Condvar, Mutex, Priority, SteadyClock, Thread, UniqueLock,
};
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const PRODUCERS: usize = 3;
const CONSUMERS: usize = 2;
const ITEMS_PER_PRODUCER: u64 = 200;
const CAPACITY: usize = 8;

/// Ring buffer state; the atomics are only touched with `lock` held
struct Channel {
    lock: Mutex,
    not_empty: Condvar,
    not_full: Condvar,
    slots: [AtomicU64; CAPACITY],
    head: AtomicUsize,
    len: AtomicUsize,
    produced: AtomicU64,
    consumed: AtomicU64,
    consumed_sum: AtomicU64,
}

impl Channel {
    fn new() -> Self {
        Self {
            lock: Mutex::new(),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            slots: std::array::from_fn(|_| AtomicU64::new(0)),
            head: AtomicUsize::new(0),
            len: AtomicUsize::new(0),
            produced: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            consumed_sum: AtomicU64::new(0),
        }
    }

    fn total() -> u64 {
        PRODUCERS as u64 * ITEMS_PER_PRODUCER
    }

    fn put(&self, value: u64) {
        let mut guard = UniqueLock::new(&self.lock);
        self.not_full
            .wait_pred(&mut guard, || self.len.load(Ordering::Relaxed) < CAPACITY);

        let len = self.len.load(Ordering::Relaxed);
        let tail = (self.head.load(Ordering::Relaxed) + len) % CAPACITY;
        self.slots[tail].store(value, Ordering::Relaxed);
        self.len.store(len + 1, Ordering::Relaxed);
        self.produced.fetch_add(1, Ordering::Relaxed);
        self.not_empty.notify_one();
    }

    /// Take one item; `None` once everything has been consumed
    fn take(&self) -> Option<u64> {
        let mut guard = UniqueLock::new(&self.lock);
        self.not_empty.wait_pred(&mut guard, || {
            self.len.load(Ordering::Relaxed) > 0
                || self.consumed.load(Ordering::Relaxed) == Self::total()
        });
        let len = self.len.load(Ordering::Relaxed);
        if len == 0 {
            return None;
        }

        let head = self.head.load(Ordering::Relaxed);
        let value = self.slots[head].load(Ordering::Relaxed);
        self.head.store((head + 1) % CAPACITY, Ordering::Relaxed);
        self.len.store(len - 1, Ordering::Relaxed);
        self.consumed_sum.fetch_add(value, Ordering::Relaxed);
        if self.consumed.fetch_add(1, Ordering::Relaxed) + 1 == Self::total() {
            // Last item: release every consumer still waiting
            self.not_empty.notify_all();
        }
        self.not_full.notify_one();
        Some(value)
    }
}

fn main() -> ExitCode {
    init_tracing();

    let config = match KernelConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Invalid kernel configuration");
            eprintln!("{:?}", miette::Report::new(err));
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = kernel::init(config) {
        error!(error = %err, "Kernel configuration rejected");
        return ExitCode::FAILURE;
    }
    info!(
        tick_hz = kernel::config().tick_frequency,
        cpus = Thread::hardware_concurrency(),
        "rtos-std demo starting"
    );

    let channel = Arc::new(Channel::new());
    let start = SteadyClock::now();
    let mut threads = Vec::new();

    for index in 0..CONSUMERS {
        let channel = channel.clone();
        let spawned = Builder::new()
            .name(format!("consumer-{index}"))
            .priority(Priority::HIGH)
            .spawn(move || {
                let mut taken = 0u64;
                while channel.take().is_some() {
                    taken += 1;
                }
                info!(taken, "Consumer finished");
            });
        match spawned {
            Ok(thread) => threads.push(thread),
            Err(err) => {
                error!(error = %err, "Could not start consumer");
                return ExitCode::FAILURE;
            }
        }
    }

    for index in 0..PRODUCERS {
        let channel = channel.clone();
        threads.push(Thread::spawn(move || {
            for item in 1..=ITEMS_PER_PRODUCER {
                channel.put(item);
                if item % 50 == 0 {
                    this_thread::sleep_for(Duration::from_millis(1));
                }
            }
            info!(producer = index, "Producer finished");
        }));
    }

    for thread in &threads {
        thread.join();
    }

    let expected_sum = PRODUCERS as u64 * ITEMS_PER_PRODUCER * (ITEMS_PER_PRODUCER + 1) / 2;
    let consumed_sum = channel.consumed_sum.load(Ordering::Relaxed);
    info!(
        produced = channel.produced.load(Ordering::Relaxed),
        consumed = channel.consumed.load(Ordering::Relaxed),
        consumed_sum,
        expected_sum,
        elapsed_us = start.elapsed().as_micros() as u64,
        "rtos-std demo finished"
    );

    if consumed_sum == expected_sum {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
