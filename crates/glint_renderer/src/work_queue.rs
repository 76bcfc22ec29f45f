//! Bounded work queue served by a fixed pool of OS threads.
//!
//! The producer publishes jobs into a ring of slots and advances a
//! `submitted` counter. Workers claim jobs by compare-and-swap on a `next`
//! counter, so every job runs exactly once, and count finished jobs in
//! `completed`. All three counters only ever grow; a job's slot is its
//! index modulo the capacity. Idle workers block on a counting semaphore
//! that is released whenever a job is published or finished.
//!
//! The producer does not sit idle while a pass runs: after publishing it
//! drains the queue alongside the workers, then waits for stragglers.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Number of worker threads to start by default: one per core, minus one
/// for the producer. May be zero on a single-core machine, in which case
/// the producer does all the work.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get() - 1)
        .unwrap_or(0)
}

/// Counting semaphore built from a mutex and a condition variable.
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
    max_permits: usize,
}

impl Semaphore {
    /// Create a semaphore with no permits that saturates at `max_permits`.
    pub fn new(max_permits: usize) -> Self {
        Self {
            permits: Mutex::new(0),
            available: Condvar::new(),
            max_permits: max_permits.max(1),
        }
    }

    /// Add a permit and wake one waiter.
    pub fn release(&self) {
        let mut permits = lock(&self.permits);
        *permits = (*permits + 1).min(self.max_permits);
        self.available.notify_one();
    }

    /// Fill up to the maximum and wake every waiter.
    pub fn release_all(&self) {
        *lock(&self.permits) = self.max_permits;
        self.available.notify_all();
    }

    /// Block until a permit is available, then take it.
    pub fn acquire(&self) {
        let mut permits = lock(&self.permits);
        while *permits == 0 {
            permits = self
                .available
                .wait(permits)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *permits -= 1;
    }

    #[cfg(test)]
    fn permits(&self) -> usize {
        *lock(&self.permits)
    }
}

type Handler<T> = Box<dyn Fn(T) + Send + Sync>;

struct Shared<T> {
    slots: Vec<Mutex<Option<T>>>,
    submitted: AtomicUsize,
    next: AtomicUsize,
    completed: AtomicUsize,
    shutdown: AtomicBool,
    panicked: AtomicBool,
    wake: Semaphore,
    handler: Handler<T>,
}

impl<T> Shared<T> {
    /// Claim and run one job. Returns `false` once nothing is claimable.
    fn try_process(&self) -> bool {
        loop {
            let claim = self.next.load(Ordering::SeqCst);
            if claim >= self.submitted.load(Ordering::SeqCst) {
                return false;
            }
            if self
                .next
                .compare_exchange_weak(claim, claim + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                self.run(claim);
                return true;
            }
        }
    }

    fn run(&self, index: usize) {
        let job = lock(&self.slots[index % self.slots.len()]).take();
        if let Some(job) = job {
            if panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(job))).is_err() {
                log::error!("Work queue job {} panicked", index);
                self.panicked.store(true, Ordering::SeqCst);
            }
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.wake.release();
    }
}

/// A bounded queue plus the threads that drain it.
///
/// Every job goes through the same handler. Dropping the pool stops and
/// joins the workers.
pub struct WorkerPool<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Start `worker_count` threads serving a queue of `capacity` slots.
    pub fn new<F>(capacity: usize, worker_count: usize, handler: F) -> io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        assert!(capacity > 0, "work queue capacity must be positive");

        let shared = Arc::new(Shared {
            slots: (0..capacity).map(|_| Mutex::new(None)).collect(),
            submitted: AtomicUsize::new(0),
            next: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
            panicked: AtomicBool::new(false),
            wake: Semaphore::new(worker_count),
            handler: Box::new(handler),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(worker_count),
        };
        for index in 0..worker_count {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("glint-worker-{index}"))
                .spawn(move || worker_loop(&shared))?;
            pool.workers.push(handle);
        }

        log::info!(
            "Started work queue: {} worker threads, capacity {}",
            worker_count,
            capacity
        );
        Ok(pool)
    }

    #[cfg(test)]
    fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Total jobs completed over the life of the pool.
    #[cfg(test)]
    fn completed(&self) -> usize {
        self.shared.completed.load(Ordering::SeqCst)
    }

    /// Run one pass: publish every job, help drain the queue, and return
    /// once all of them have finished.
    ///
    /// # Panics
    ///
    /// Panics if the pass holds more jobs than the queue capacity, or if a
    /// job panicked.
    pub fn run_pass<I>(&mut self, jobs: I)
    where
        I: IntoIterator<Item = T>,
    {
        let shared = &*self.shared;
        let first = shared.submitted.load(Ordering::SeqCst);

        for job in jobs {
            let index = shared.submitted.load(Ordering::SeqCst);
            assert!(
                index - first < shared.slots.len(),
                "work queue overflow: capacity is {}",
                shared.slots.len()
            );

            // Publish the slot before the count that makes it claimable
            *lock(&shared.slots[index % shared.slots.len()]) = Some(job);
            shared.submitted.store(index + 1, Ordering::SeqCst);
            shared.wake.release();
        }

        while shared.try_process() {}

        while shared.completed.load(Ordering::SeqCst) != shared.submitted.load(Ordering::SeqCst) {
            thread::yield_now();
        }

        if shared.panicked.swap(false, Ordering::SeqCst) {
            panic!("a work queue job panicked");
        }
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.wake.release_all();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("Render worker exited abnormally");
            }
        }
    }
}

fn worker_loop<T>(shared: &Shared<T>) {
    while !shared.shutdown.load(Ordering::SeqCst) {
        if !shared.try_process() {
            shared.wake.acquire();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Pool whose jobs bump a per-row counter.
    fn counting_pool(rows: usize, workers: usize) -> (WorkerPool<usize>, Arc<Vec<AtomicUsize>>) {
        let counts: Arc<Vec<AtomicUsize>> = Arc::new((0..rows).map(|_| AtomicUsize::new(0)).collect());
        let sink = Arc::clone(&counts);
        let pool = WorkerPool::new(rows, workers, move |row: usize| {
            sink[row].fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        (pool, counts)
    }

    #[test]
    fn test_every_row_claimed_exactly_once() {
        for workers in 0..=8 {
            for rows in [1, 2, 7, 64, 257] {
                let (mut pool, counts) = counting_pool(rows, workers);
                for pass in 1..=3 {
                    pool.run_pass(0..rows);
                    for (row, count) in counts.iter().enumerate() {
                        assert_eq!(
                            count.load(Ordering::SeqCst),
                            pass,
                            "row {row} with {workers} workers, pass {pass}"
                        );
                    }
                }
                assert_eq!(pool.completed(), 3 * rows);
            }
        }
    }

    #[test]
    fn test_workers_share_the_load() {
        let seen = Arc::new(Mutex::new(std::collections::HashSet::new()));
        let sink = Arc::clone(&seen);
        let mut pool = WorkerPool::new(64, 3, move |_: usize| {
            thread::sleep(Duration::from_millis(2));
            sink.lock().unwrap().insert(thread::current().id());
        })
        .unwrap();

        pool.run_pass(0..64);
        assert!(seen.lock().unwrap().len() > 1);
    }

    #[test]
    fn test_partial_passes() {
        let (mut pool, counts) = counting_pool(10, 2);
        pool.run_pass(0..4);
        pool.run_pass(4..10);
        pool.run_pass(Vec::new());
        assert!(counts.iter().all(|c| c.load(Ordering::SeqCst) == 1));
    }

    #[test]
    #[should_panic(expected = "work queue overflow")]
    fn test_overflow_panics() {
        let (mut pool, _) = counting_pool(4, 0);
        pool.run_pass(0..5);
    }

    #[test]
    #[should_panic(expected = "a work queue job panicked")]
    fn test_job_panic_surfaces_in_producer() {
        let mut pool = WorkerPool::new(8, 2, |row: usize| {
            if row == 5 {
                panic!("row {row} failed");
            }
        })
        .unwrap();
        pool.run_pass(0..8);
    }

    #[test]
    fn test_drop_joins_idle_workers() {
        let (pool, _) = counting_pool(4, 4);
        assert_eq!(pool.worker_count(), 4);
        drop(pool);
    }

    #[test]
    fn test_semaphore_saturates() {
        let semaphore = Semaphore::new(2);
        for _ in 0..5 {
            semaphore.release();
        }
        assert_eq!(semaphore.permits(), 2);
        semaphore.acquire();
        semaphore.acquire();
        assert_eq!(semaphore.permits(), 0);
    }

    #[test]
    fn test_semaphore_wakes_waiter() {
        let semaphore = Arc::new(Semaphore::new(1));
        let waiter = {
            let semaphore = Arc::clone(&semaphore);
            thread::spawn(move || semaphore.acquire())
        };
        thread::sleep(Duration::from_millis(10));
        semaphore.release();
        waiter.join().unwrap();
    }
}
