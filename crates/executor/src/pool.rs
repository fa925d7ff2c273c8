//! Bounded worker pool for batch chunks.
//!
//! A fixed number of named threads pull boxed jobs from one FIFO queue. With a
//! single worker, jobs run strictly in submission order, which is what ordered
//! batches rely on.
//!
//! The pool is torn down in one of two ways:
//!
//! - [`WorkerPool::shutdown`] lets the workers finish every queued job and
//!   joins them.
//! - [`WorkerPool::abandon`] discards queued jobs and detaches the workers. A
//!   worker stuck in a network call finishes it in the background and exits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use docstream_core::{Error, Result};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolInner {
    queue: Mutex<VecDeque<Job>>,
    work_ready: Condvar,
    shutdown: AtomicBool,
    active: AtomicUsize,
}

/// Fixed-size pool of named worker threads.
pub struct WorkerPool {
    inner: Arc<PoolInner>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `num_threads` workers named `{name}-0`, `{name}-1`, ...
    ///
    /// Fails with [`Error::Internal`] if a thread cannot be spawned; workers
    /// already started are shut down first.
    pub fn new(name: &str, num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(Error::invalid_argument("worker pool needs at least one thread"));
        }

        let inner = Arc::new(PoolInner {
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            shutdown: AtomicBool::new(false),
            active: AtomicUsize::new(0),
        });

        let mut pool = WorkerPool {
            inner,
            workers: Vec::with_capacity(num_threads),
        };
        for i in 0..num_threads {
            let inner = Arc::clone(&pool.inner);
            let spawned = std::thread::Builder::new()
                .name(format!("{}-{}", name, i))
                .spawn(move || worker_loop(&inner));
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    pool.shutdown();
                    return Err(Error::Internal {
                        reason: format!("failed to spawn worker thread: {}", e),
                    });
                }
            }
        }
        debug!(threads = num_threads, pool = name, "worker pool started");
        Ok(pool)
    }

    /// Number of worker threads still owned by the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Jobs waiting in the queue.
    pub fn queued(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Jobs currently running.
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Queue a job. Jobs submitted after teardown are dropped unrun.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return;
        }
        self.inner.queue.lock().push_back(Box::new(job));
        self.inner.work_ready.notify_one();
    }

    /// Run every queued job, then join all workers.
    pub fn shutdown(&mut self) {
        self.signal_shutdown();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// Discard queued jobs and detach the workers without waiting.
    ///
    /// Returns the number of discarded jobs.
    pub fn abandon(&mut self) -> usize {
        let discarded = {
            let mut queue = self.inner.queue.lock();
            let n = queue.len();
            queue.clear();
            n
        };
        self.signal_shutdown();
        let detached = self.workers.len();
        self.workers.clear();
        if detached > 0 {
            debug!(discarded, detached, "worker pool abandoned");
        }
        discarded
    }

    fn signal_shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        // Taking the lock orders this notify after any worker's check-then-wait.
        let _queue = self.inner.queue.lock();
        self.inner.work_ready.notify_all();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.abandon();
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("active", &self.active())
            .finish()
    }
}

/// Decrements `active` even if the job panics.
struct ActiveGuard<'a> {
    inner: &'a PoolInner,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.inner.active.fetch_sub(1, Ordering::Release);
    }
}

fn worker_loop(inner: &PoolInner) {
    loop {
        let job = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(job) = queue.pop_front() {
                    inner.active.fetch_add(1, Ordering::Release);
                    break job;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = ActiveGuard { inner };
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
            error!(
                "batch job panicked: {:?}",
                e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn test_submit_and_shutdown_runs_everything() {
        let mut pool = WorkerPool::new("test-pool", 3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..20 {
            let c = Arc::clone(&counter);
            pool.submit(move || {
                c.fetch_add(1, Ordering::Relaxed);
            });
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::Relaxed), 20);
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn test_single_worker_is_fifo() {
        let mut pool = WorkerPool::new("test-fifo", 1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..6 {
            let o = Arc::clone(&order);
            pool.submit(move || o.lock().push(i));
        }
        pool.shutdown();
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_abandon_discards_queued_jobs() {
        let mut pool = WorkerPool::new("test-abandon", 1).unwrap();
        let barrier = Arc::new(Barrier::new(2));
        let b = Arc::clone(&barrier);
        pool.submit(move || {
            b.wait();
        });

        // Wait for the worker to pick up the blocking job
        while pool.active() == 0 {
            std::thread::sleep(Duration::from_millis(5));
        }

        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let r = Arc::clone(&ran);
            pool.submit(move || {
                r.fetch_add(1, Ordering::Relaxed);
            });
        }
        assert_eq!(pool.abandon(), 3);
        barrier.wait();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(ran.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_panicking_job_does_not_kill_worker() {
        let mut pool = WorkerPool::new("test-panic", 1).unwrap();
        pool.submit(|| panic!("boom"));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        pool.submit(move || {
            c.fetch_add(1, Ordering::Relaxed);
        });
        pool.shutdown();
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(WorkerPool::new("test-zero", 0).unwrap_err().is_validation());
    }

    #[test]
    fn test_worker_threads_are_named() {
        let mut pool = WorkerPool::new("docstream-batch", 1).unwrap();
        let name = Arc::new(Mutex::new(None));
        let n = Arc::clone(&name);
        pool.submit(move || {
            *n.lock() = std::thread::current().name().map(str::to_string);
        });
        pool.shutdown();
        assert_eq!(name.lock().as_deref(), Some("docstream-batch-0"));
    }
}
