//! Concurrent chunked batch execution.
//!
//! [`BatchExecutor`] splits a caller's items into contiguous chunks, runs one
//! unit of work per chunk on a bounded [`WorkerPool`], and merges the chunk
//! results back into input order:
//!
//! ```text
//! items ──partition──> [c0][c1][c2]...   (sequence index per chunk)
//!                        │   │   │
//!                   worker pool (K threads, FIFO)
//!                        │   │   │
//!               Completion slots[seq] <- Done / Failed / Skipped
//!                        │
//!         merge by sequence index ──> BatchOutcome  (or one Error)
//! ```
//!
//! The caller blocks on a single deadline for the whole batch. On timeout or
//! interrupt the pool is abandoned: queued chunks are discarded and in-flight
//! calls finish unobserved.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use docstream_core::{DocumentResponse, Error, Limits, Result};
use parking_lot::{Condvar, Mutex};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::pool::WorkerPool;
use crate::types::InsertManyOptions;

/// Thread name prefix of batch workers.
pub const BATCH_THREAD_NAME: &str = "docstream-batch";

// =============================================================================
// Plan
// =============================================================================

/// Validated shape of one batch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    total: usize,
    chunk_size: usize,
    concurrency: usize,
    ordered: bool,
    timeout: Duration,
}

impl BatchPlan {
    /// Validate options against the item count and server limits.
    ///
    /// All checks happen here, before any network call:
    /// empty input, `ordered` with `concurrency > 1`, chunk size and
    /// concurrency ceilings, and a zero timeout.
    pub fn from_options(total: usize, options: &InsertManyOptions, limits: &Limits) -> Result<Self> {
        if total == 0 {
            return Err(Error::EmptyBatch);
        }
        if options.ordered && options.concurrency > 1 {
            return Err(Error::OrderedConcurrency {
                concurrency: options.concurrency,
            });
        }
        limits.validate_chunk_size(options.chunk_size)?;
        limits.validate_concurrency(options.concurrency)?;
        if options.timeout.is_zero() {
            return Err(Error::invalid_argument("batch timeout must be positive"));
        }

        Ok(BatchPlan {
            total,
            chunk_size: options.chunk_size,
            concurrency: options.concurrency,
            ordered: options.ordered,
            timeout: options.timeout,
        })
    }

    /// Number of items in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Items per chunk; the last chunk may be shorter.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Worker threads requested.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// True if the batch stops at the first failing chunk.
    pub fn ordered(&self) -> bool {
        self.ordered
    }

    /// Deadline for the whole batch.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `ceil(total / chunk_size)`.
    pub fn chunk_count(&self) -> usize {
        (self.total + self.chunk_size - 1) / self.chunk_size
    }

    /// Split items into contiguous chunks tagged with their sequence index.
    pub fn partition<T>(&self, items: Vec<T>) -> Vec<Chunk<T>> {
        let mut chunks = Vec::with_capacity(self.chunk_count());
        let mut iter = items.into_iter().peekable();
        let mut sequence = 0;
        while iter.peek().is_some() {
            let items: Vec<T> = iter.by_ref().take(self.chunk_size).collect();
            chunks.push(Chunk { sequence, items });
            sequence += 1;
        }
        chunks
    }
}

/// A contiguous sub-range of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<T> {
    /// 0-based position among the batch's chunks
    pub sequence: usize,
    /// Items of this chunk, in input order
    pub items: Vec<T>,
}

// =============================================================================
// Results
// =============================================================================

/// Outcome of one successful chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkResult {
    /// Sequence index of the chunk
    pub sequence: usize,
    /// Identifiers in the chunk's input order
    pub inserted_ids: Vec<Value>,
    /// Per-document statuses, when requested
    pub document_responses: Option<Vec<DocumentResponse>>,
}

/// Merged outcome of a whole batch, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Identifiers of all inserted documents
    pub inserted_ids: Vec<Value>,
    /// Per-document statuses, when requested
    pub document_responses: Option<Vec<DocumentResponse>>,
    /// Number of chunks executed
    pub chunks: usize,
}

/// Result of `insert_many`.
pub type InsertManyResult = BatchOutcome;

impl BatchOutcome {
    /// Concatenate chunk results by sequence index, whatever order they
    /// arrived in.
    pub fn merge(mut results: Vec<ChunkResult>) -> Self {
        results.sort_by_key(|r| r.sequence);
        let mut outcome = BatchOutcome {
            chunks: results.len(),
            ..Default::default()
        };
        for result in results {
            outcome.inserted_ids.extend(result.inserted_ids);
            if let Some(responses) = result.document_responses {
                outcome
                    .document_responses
                    .get_or_insert_with(Vec::new)
                    .extend(responses);
            }
        }
        outcome
    }
}

// =============================================================================
// Interrupt
// =============================================================================

/// Token that aborts a blocked batch call from another thread.
///
/// Once triggered the flag stays set: every batch waiting on, or later started
/// with, this handle fails with [`Error::Interrupted`].
#[derive(Clone, Default)]
pub struct InterruptHandle {
    inner: Arc<InterruptInner>,
}

#[derive(Default)]
struct InterruptInner {
    flag: AtomicBool,
    waiters: Mutex<Vec<Weak<Completion>>>,
}

impl InterruptHandle {
    /// Create an untriggered handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the interrupt and wake any waiting batch.
    pub fn interrupt(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        let waiters = self.inner.waiters.lock();
        for waiter in waiters.iter().filter_map(Weak::upgrade) {
            waiter.wake();
        }
    }

    /// True once [`interrupt`](Self::interrupt) was called.
    pub fn is_interrupted(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    fn register(&self, completion: &Arc<Completion>) {
        let mut waiters = self.inner.waiters.lock();
        waiters.retain(|w| w.strong_count() > 0);
        waiters.push(Arc::downgrade(completion));
    }
}

impl std::fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptHandle")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

// =============================================================================
// Completion
// =============================================================================

enum Slot {
    Pending,
    Done(ChunkResult),
    Failed(Error),
    Skipped,
}

struct CompletionState {
    slots: Vec<Slot>,
    finished: usize,
}

/// One result slot per chunk, written by workers, awaited by the caller.
struct Completion {
    state: Mutex<CompletionState>,
    done: Condvar,
}

enum Wait {
    Finished(Vec<Slot>),
    TimedOut { completed: usize },
    Interrupted { completed: usize },
}

impl Completion {
    fn new(chunks: usize) -> Self {
        Completion {
            state: Mutex::new(CompletionState {
                slots: (0..chunks).map(|_| Slot::Pending).collect(),
                finished: 0,
            }),
            done: Condvar::new(),
        }
    }

    fn record(&self, sequence: usize, slot: Slot) {
        let mut state = self.state.lock();
        if let Some(entry) = state.slots.get_mut(sequence) {
            if matches!(entry, Slot::Pending) {
                *entry = slot;
                state.finished += 1;
            }
        }
        self.done.notify_all();
    }

    fn wake(&self) {
        let _state = self.state.lock();
        self.done.notify_all();
    }

    fn wait(&self, deadline: Instant, interrupt: Option<&InterruptHandle>) -> Wait {
        let mut state = self.state.lock();
        loop {
            if state.finished == state.slots.len() {
                return Wait::Finished(std::mem::take(&mut state.slots));
            }
            if interrupt.is_some_and(InterruptHandle::is_interrupted) {
                return Wait::Interrupted {
                    completed: state.finished,
                };
            }
            if Instant::now() >= deadline {
                return Wait::TimedOut {
                    completed: state.finished,
                };
            }
            self.done.wait_until(&mut state, deadline);
        }
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs one validated [`BatchPlan`].
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    plan: BatchPlan,
}

impl BatchExecutor {
    /// Executor for a validated plan.
    pub fn new(plan: BatchPlan) -> Self {
        BatchExecutor { plan }
    }

    /// The plan being executed.
    pub fn plan(&self) -> &BatchPlan {
        &self.plan
    }

    /// Run `work` once per chunk and merge the results in input order.
    ///
    /// Blocks until every chunk finished, the deadline passed, or `interrupt`
    /// fired.
    ///
    /// # Errors
    ///
    /// - The error of the lowest-index failing chunk, unchanged
    /// - [`Error::WorkerPanicked`] if `work` panicked for that chunk
    /// - [`Error::BatchTimeout`] when the deadline passes first
    /// - [`Error::Interrupted`] when `interrupt` fires first, or already had
    ///
    /// No partial outcome is returned on any error.
    pub fn execute<T, W>(
        &self,
        items: Vec<T>,
        work: W,
        interrupt: Option<&InterruptHandle>,
    ) -> Result<BatchOutcome>
    where
        T: Send + 'static,
        W: Fn(Chunk<T>) -> Result<ChunkResult> + Send + Sync + 'static,
    {
        let plan = &self.plan;
        if items.len() != plan.total {
            return Err(Error::Internal {
                reason: format!(
                    "batch planned for {} items, got {}",
                    plan.total,
                    items.len()
                ),
            });
        }

        let chunks = plan.partition(items);
        let total = chunks.len();
        if interrupt.is_some_and(InterruptHandle::is_interrupted) {
            return Err(Error::Interrupted {
                completed: 0,
                total,
            });
        }

        let completion = Arc::new(Completion::new(total));
        if let Some(handle) = interrupt {
            handle.register(&completion);
        }
        let halted = Arc::new(AtomicBool::new(false));
        let work = Arc::new(work);
        let threads = plan.concurrency.min(total);

        debug!(
            items = plan.total,
            chunks = total,
            chunk_size = plan.chunk_size,
            threads,
            ordered = plan.ordered,
            "starting batch"
        );

        let started = Instant::now();
        let deadline = started + plan.timeout;
        let mut pool = WorkerPool::new(BATCH_THREAD_NAME, threads)?;
        for chunk in chunks {
            let work = Arc::clone(&work);
            let completion = Arc::clone(&completion);
            let halted = Arc::clone(&halted);
            let ordered = plan.ordered;
            pool.submit(move || run_chunk(chunk, &*work, &completion, &halted, ordered));
        }

        match completion.wait(deadline, interrupt) {
            Wait::Finished(slots) => {
                pool.shutdown();
                let outcome = merge_slots(slots)?;
                info!(
                    chunks = outcome.chunks,
                    inserted = outcome.inserted_ids.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "batch complete"
                );
                Ok(outcome)
            }
            Wait::TimedOut { completed } => {
                let discarded = pool.abandon();
                warn!(
                    completed,
                    total,
                    discarded,
                    timeout_ms = plan.timeout.as_millis() as u64,
                    "batch timed out"
                );
                Err(Error::BatchTimeout {
                    timeout: plan.timeout,
                    completed,
                    total,
                })
            }
            Wait::Interrupted { completed } => {
                let discarded = pool.abandon();
                warn!(completed, total, discarded, "batch interrupted");
                Err(Error::Interrupted { completed, total })
            }
        }
    }
}

fn run_chunk<T, W>(chunk: Chunk<T>, work: &W, completion: &Completion, halted: &AtomicBool, ordered: bool)
where
    W: Fn(Chunk<T>) -> Result<ChunkResult>,
{
    let sequence = chunk.sequence;
    if halted.load(Ordering::Acquire) {
        debug!(chunk = sequence, "skipping chunk after earlier failure");
        completion.record(sequence, Slot::Skipped);
        return;
    }

    let slot = match catch_unwind(AssertUnwindSafe(|| work(chunk))) {
        Ok(Ok(mut result)) => {
            result.sequence = sequence;
            Slot::Done(result)
        }
        Ok(Err(e)) => {
            warn!(chunk = sequence, error = %e, "chunk failed");
            Slot::Failed(e)
        }
        Err(_) => {
            error!(chunk = sequence, "chunk worker panicked");
            Slot::Failed(Error::WorkerPanicked { chunk: sequence })
        }
    };

    if ordered && matches!(slot, Slot::Failed(_)) {
        halted.store(true, Ordering::Release);
    }
    completion.record(sequence, slot);
}

// Slots are indexed by sequence, so the first failure is the lowest-index one.
fn merge_slots(slots: Vec<Slot>) -> Result<BatchOutcome> {
    let mut results = Vec::with_capacity(slots.len());
    for (sequence, slot) in slots.into_iter().enumerate() {
        match slot {
            Slot::Done(result) => results.push(result),
            Slot::Failed(e) => return Err(e),
            Slot::Pending | Slot::Skipped => {
                return Err(Error::Internal {
                    reason: format!("chunk {} finished without a result", sequence),
                })
            }
        }
    }
    Ok(BatchOutcome::merge(results))
}
