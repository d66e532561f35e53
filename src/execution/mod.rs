//! Execution engine for running engine queries with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) execution for filter and group-by aggregation
//! - Resource limits / throttling (bounded in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring
//!
//! Results always equal the sequential [`crate::processing::filter()`] and
//! [`crate::processing::aggregate()`]: filter chunks are concatenated in input order, and
//! per-chunk group tables are merged with associative accumulators. Floating-point sums may
//! differ from the sequential result in the last bits because addition order changes.

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::QueryResult;
use crate::processing::{AggregateSpec, FilterSpec, GroupTable};
use crate::types::{DataSet, Value};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of rows per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks, on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// A configurable execution engine for [`DataSet`] queries.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size == 0`, `max_in_flight_chunks == 0`, `num_threads == Some(0)`, or the
    /// thread pool cannot be created.
    pub fn new(opts: ExecutionOptions) -> Self {
        assert!(opts.chunk_size > 0, "chunk_size must be > 0");
        assert!(opts.max_in_flight_chunks > 0, "max_in_flight_chunks must be > 0");
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_threads))
            .thread_name(|i| format!("dashboard-exec-{i}"))
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Parallel [`crate::processing::filter()`].
    ///
    /// The spec is validated once up front, so errors are reported before any chunk runs.
    pub fn filter_parallel(&self, dataset: &DataSet, spec: &FilterSpec) -> QueryResult<DataSet> {
        let compiled = spec.compile(&dataset.schema)?;
        Ok(self.filter_where_parallel(dataset, |row| compiled.matches(row)))
    }

    /// Parallel [`crate::processing::filter_where()`] with an arbitrary row predicate.
    pub fn filter_where_parallel<F>(&self, dataset: &DataSet, predicate: F) -> DataSet
    where
        F: Fn(&[Value]) -> bool + Send + Sync,
    {
        self.run(|| {
            let per_chunk: Vec<Vec<Vec<Value>>> = self.run_chunks(dataset.row_count(), |range| {
                let kept: Vec<Vec<Value>> = dataset.rows[range]
                    .iter()
                    .filter(|row| predicate(row.as_slice()))
                    .cloned()
                    .collect();
                (kept.len(), kept)
            });
            DataSet::new(dataset.schema.clone(), per_chunk.into_iter().flatten().collect())
        })
    }

    /// Parallel [`crate::processing::aggregate()`].
    ///
    /// Each chunk builds its own group table; tables are merged pairwise and finished once.
    pub fn aggregate_parallel(&self, dataset: &DataSet, spec: &AggregateSpec) -> QueryResult<DataSet> {
        let plan = spec.compile(&dataset.schema)?;
        self.run(|| {
            self.emit(ExecutionEvent::AggregateStarted {
                group_by: spec.group_by.clone(),
                aggregates: spec.aggregates.len(),
            });

            let tables = self.run_chunks(dataset.row_count(), |range| {
                let mut table = GroupTable::new(&plan);
                for row in &dataset.rows[range] {
                    table.update(row);
                }
                (table.group_count(), table)
            });

            let merged = tables
                .into_par_iter()
                .reduce_with(|mut acc, next| {
                    acc.merge(next);
                    acc
                })
                .unwrap_or_else(|| GroupTable::new(&plan));

            let out = merged.finish();
            if let Ok(ds) = &out {
                self.emit(ExecutionEvent::AggregateFinished {
                    groups: ds.row_count(),
                });
            }
            out
        })
    }

    /// Wrap one run: reset metrics, install the pool, report start/finish.
    fn run<T, F>(&self, body: F) -> T
    where
        T: RunOutput + Send,
        F: FnOnce() -> T + Send,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let out = self.pool.install(body);

        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed, out.rows_emitted());
        self.emit(ExecutionEvent::RunFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });
        out
    }

    /// Run `work` over each chunk of `0..row_count` in parallel, in chunk order.
    ///
    /// `work` returns the chunk's output size (for events) alongside its result.
    fn run_chunks<T, F>(&self, row_count: usize, work: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> (usize, T) + Send + Sync,
    {
        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        chunk_ranges(row_count, self.opts.chunk_size)
            .into_par_iter()
            .map(|range| {
                let (_permit, waited) = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                let rows = range.len();
                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_row: range.start,
                    row_count: rows,
                });

                let (output_rows, result) = work(range);

                self.metrics.on_rows_processed(rows);
                self.emit(ExecutionEvent::ChunkFinished { output_rows });
                self.metrics.on_chunk_end();
                result
            })
            .collect()
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// What a run produced, as counted by [`ExecutionMetrics`].
trait RunOutput {
    fn rows_emitted(&self) -> usize;
}

impl RunOutput for DataSet {
    fn rows_emitted(&self) -> usize {
        self.row_count()
    }
}

impl RunOutput for QueryResult<DataSet> {
    fn rows_emitted(&self) -> usize {
        self.as_ref().map_or(0, DataSet::row_count)
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..row_count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(row_count))
        .collect()
}
