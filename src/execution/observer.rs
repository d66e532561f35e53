use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted,
    ThrottleWaited { duration: Duration },
    ChunkStarted { start_row: usize, row_count: usize },
    /// `output_rows` is the number of kept rows (filter) or partial groups (aggregate).
    ChunkFinished { output_rows: usize },
    AggregateStarted { group_by: Vec<String>, aggregates: usize },
    AggregateFinished { groups: usize },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted => f.write_str("run started"),
            Self::ThrottleWaited { duration } => write!(f, "throttled for {duration:?}"),
            Self::ChunkStarted { start_row, row_count } => {
                write!(f, "chunk started start_row={start_row} rows={row_count}")
            }
            Self::ChunkFinished { output_rows } => write!(f, "chunk finished output_rows={output_rows}"),
            Self::AggregateStarted { group_by, aggregates } => {
                write!(f, "aggregate started group_by={group_by:?} aggregates={aggregates}")
            }
            Self::AggregateFinished { groups } => write!(f, "aggregate finished groups={groups}"),
            Self::RunFinished { metrics, .. } => write!(f, "run finished {metrics}"),
        }
    }
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Logs execution events to stderr.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("[exec] {event}");
    }
}

/// Real-time metrics for an execution run.
///
/// The engine updates these counters during execution; callers can snapshot them at any time.
/// Counters reset at the start of every run.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    rows_processed: AtomicU64,
    rows_emitted: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active_chunks: AtomicUsize,
    max_active_chunks: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_run(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
        for counter in [
            &self.elapsed_ns,
            &self.rows_processed,
            &self.rows_emitted,
            &self.chunks_started,
            &self.chunks_finished,
            &self.throttle_wait_ns,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
        self.active_chunks.store(0, Ordering::SeqCst);
        self.max_active_chunks.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration, rows_emitted: usize) {
        self.elapsed_ns.store(saturating_nanos(elapsed), Ordering::SeqCst);
        self.rows_emitted.store(rows_emitted as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_rows_processed(&self, n: usize) {
        self.rows_processed.fetch_add(n as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_chunk_start(&self) {
        self.chunks_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_chunks.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn on_chunk_end(&self) {
        self.chunks_finished.fetch_add(1, Ordering::SeqCst);
        self.active_chunks.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn on_throttle_wait(&self, d: Duration) {
        self.throttle_wait_ns.fetch_add(saturating_nanos(d), Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            rows_processed: self.rows_processed.load(Ordering::SeqCst),
            rows_emitted: self.rows_emitted.load(Ordering::SeqCst),
            chunks_started: self.chunks_started.load(Ordering::SeqCst),
            chunks_finished: self.chunks_finished.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
            max_active_chunks: self.max_active_chunks.load(Ordering::SeqCst),
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u64::MAX as u128) as u64
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub rows_processed: u64,
    /// Rows in the run's output dataset.
    pub rows_emitted: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    pub throttle_wait: Duration,
    pub max_active_chunks: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, rows={}->{}, chunks={}/{}, max_active_chunks={}, throttle_wait={:?}, elapsed={:?}",
            self.run_id,
            self.rows_processed,
            self.rows_emitted,
            self.chunks_finished,
            self.chunks_started,
            self.max_active_chunks,
            self.throttle_wait,
            self.elapsed
        )
    }
}
