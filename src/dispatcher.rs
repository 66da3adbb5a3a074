//! # Row Dispatcher
//!
//! Fans the rows of one image out over a fixed number of worker threads and
//! joins them before returning.
//!
//! ```text
//! caller thread ──┬── spawn worker 1 ─┐
//!                 ├── spawn worker 2 ─┤
//!                 ├── ...             │
//!                 ├── run worker 0    │
//!                 └── join 1..N ◄─────┘
//! ```
//!
//! The calling thread is worker 0, so `N` workers cost `N - 1` spawns.
//!
//! The output buffer is split into per-row `&mut [u32]` slices up front and
//! each worker receives ownership of exactly the rows its [`Partition`]
//! assigns it. Workers share nothing mutable, so the only synchronization is
//! the join at the end of the thread scope.

use crate::kernel::{EscapeTimeKernel, RowKernel};
use crate::partition::Partition;
use crate::view::{ImageShape, Viewport};
use log::{debug, info};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Upper bound on worker threads per dispatch.
pub const MAX_THREADS: usize = 32;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("at least one thread is required")]
    NoThreads,
    #[error("max allowed threads is {max}, requested {requested}")]
    TooManyThreads { requested: usize, max: usize },
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: usize, height: usize },
    #[error("output buffer holds {actual} pixels but the image needs {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("failed to spawn worker thread {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Timing for one worker's share of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub rows: usize,
    pub elapsed: Duration,
}

/// Outcome of [`RowDispatcher::run`], one entry per worker in id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub workers: Vec<WorkerReport>,
    pub elapsed: Duration,
}

impl DispatchReport {
    pub fn total_rows(&self) -> usize {
        self.workers.iter().map(|w| w.rows).sum()
    }

    /// The worker that finished last, which bounds the wall time.
    pub fn slowest(&self) -> Option<&WorkerReport> {
        self.workers.iter().max_by_key(|w| w.elapsed)
    }
}

type RowAssignment<'a> = Vec<(usize, &'a mut [u32])>;

/// Static fan-out/fan-in of image rows over `num_threads` workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowDispatcher {
    num_threads: usize,
    partition: Partition,
}

impl RowDispatcher {
    pub fn new(num_threads: usize, partition: Partition) -> Result<Self, DispatchError> {
        if num_threads == 0 {
            return Err(DispatchError::NoThreads);
        }
        if num_threads > MAX_THREADS {
            return Err(DispatchError::TooManyThreads {
                requested: num_threads,
                max: MAX_THREADS,
            });
        }
        Ok(Self {
            num_threads,
            partition,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Renders the whole image described by `kernel` into `output`.
    ///
    /// Spawns `num_threads - 1` scoped threads, runs worker 0 on the caller,
    /// and joins every spawned thread before returning. A panic inside a
    /// worker is re-raised here once the scope has joined.
    pub fn run<K: RowKernel>(
        &self,
        kernel: &K,
        output: &mut [u32],
    ) -> Result<DispatchReport, DispatchError> {
        let shape = kernel.shape();
        if shape.is_empty() {
            return Err(DispatchError::EmptyImage {
                width: shape.width,
                height: shape.height,
            });
        }
        if output.len() != shape.len() {
            return Err(DispatchError::BufferSize {
                expected: shape.len(),
                actual: output.len(),
            });
        }

        let mut assignments = self.assign_rows(shape, output).into_iter();
        let local = assignments.next().unwrap_or_default();

        debug!(
            "Dispatching {} rows to {} workers ({})",
            shape.height, self.num_threads, self.partition
        );
        let start = Instant::now();

        let workers = thread::scope(|s| -> Result<Vec<WorkerReport>, DispatchError> {
            let mut handles = Vec::with_capacity(self.num_threads - 1);
            for (i, rows) in assignments.enumerate() {
                let worker = i + 1;
                let handle = thread::Builder::new()
                    .name(format!("mandel-worker-{}", worker))
                    .spawn_scoped(s, move || run_worker(kernel, worker, rows))
                    .map_err(|source| DispatchError::Spawn { worker, source })?;
                handles.push(handle);
            }

            let mut reports = Vec::with_capacity(self.num_threads);
            reports.push(run_worker(kernel, 0, local));
            for handle in handles {
                match handle.join() {
                    Ok(report) => reports.push(report),
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
            Ok(reports)
        })?;

        let elapsed = start.elapsed();
        debug!("All {} workers joined after {:?}", self.num_threads, elapsed);
        Ok(DispatchReport { workers, elapsed })
    }

    /// Splits `output` into row slices and buckets them by owning worker.
    fn assign_rows<'a>(
        &self,
        shape: ImageShape,
        output: &'a mut [u32],
    ) -> Vec<RowAssignment<'a>> {
        let mut buckets: Vec<RowAssignment<'a>> = (0..self.num_threads)
            .map(|worker| {
                let expected = self
                    .partition
                    .rows_for(worker, self.num_threads, shape.height)
                    .len();
                Vec::with_capacity(expected)
            })
            .collect();

        for (row, slice) in output.chunks_mut(shape.width).enumerate() {
            let owner = self.partition.owner_of(row, self.num_threads, shape.height);
            buckets[owner].push((row, slice));
        }
        buckets
    }
}

fn run_worker<K: RowKernel + ?Sized>(
    kernel: &K,
    worker: usize,
    rows: RowAssignment<'_>,
) -> WorkerReport {
    let start = Instant::now();
    let count = rows.len();
    for (row, out) in rows {
        kernel.compute_row(row, out);
    }
    let elapsed = start.elapsed();
    info!(
        "[worker thread {}]:\t\t[{:.3}] ms",
        worker,
        elapsed.as_secs_f64() * 1000.0
    );
    WorkerReport {
        worker,
        rows: count,
        elapsed,
    }
}

/// Renders the escape-time image over `viewport` with interleaved rows.
pub fn mandelbrot_thread(
    num_threads: usize,
    viewport: Viewport,
    shape: ImageShape,
    max_iterations: u32,
    output: &mut [u32],
) -> Result<DispatchReport, DispatchError> {
    let kernel = EscapeTimeKernel::new(viewport, shape, max_iterations);
    RowDispatcher::new(num_threads, Partition::Interleaved)?.run(&kernel, output)
}
