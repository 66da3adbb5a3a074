//! Serial-versus-threaded timing harness.
//!
//! Renders the configured image once serially as the reference, then with the
//! [`RowDispatcher`], keeping the best wall time of each over several runs.
//! The threaded image must match the reference pixel for pixel.

use crate::config::Config;
use crate::dispatcher::{DispatchError, RowDispatcher};
use crate::kernel::{mandelbrot_serial, EscapeTimeKernel, RowKernel};
use crate::partition::Partition;
use crate::view::ImageShape;
use log::{info, warn};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("image sizes differ: expected {expected} pixels, actual {actual}")]
    Length { expected: usize, actual: usize },
    #[error("mismatch at [{row}][{col}]: expected {expected}, actual {actual}")]
    Pixel {
        row: usize,
        col: usize,
        expected: u32,
        actual: u32,
    },
}

#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("threaded output differs from serial output: {0}")]
    Verify(#[from] VerifyError),
}

/// Best-of-N timings for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchReport {
    pub num_threads: usize,
    pub partition: Partition,
    pub serial: Duration,
    pub threaded: Duration,
}

impl BenchReport {
    pub fn speedup(&self) -> f64 {
        let threaded = self.threaded.as_secs_f64();
        if threaded == 0.0 {
            return f64::INFINITY;
        }
        self.serial.as_secs_f64() / threaded
    }
}

/// Runs `f` `runs` times (at least once) and returns the fastest wall time.
pub fn time_best_of<F, E>(runs: usize, mut f: F) -> Result<Duration, E>
where
    F: FnMut() -> Result<(), E>,
{
    let mut best = Duration::MAX;
    for _ in 0..runs.max(1) {
        let start = Instant::now();
        f()?;
        best = best.min(start.elapsed());
    }
    Ok(best)
}

/// Compares two row-major images and reports the first differing pixel.
pub fn verify(expected: &[u32], actual: &[u32], shape: ImageShape) -> Result<(), VerifyError> {
    if expected.len() != actual.len() || expected.len() != shape.len() {
        return Err(VerifyError::Length {
            expected: shape.len(),
            actual: actual.len(),
        });
    }
    match expected.iter().zip(actual).position(|(e, a)| e != a) {
        None => Ok(()),
        Some(index) => Err(VerifyError::Pixel {
            row: index / shape.width,
            col: index % shape.width,
            expected: expected[index],
            actual: actual[index],
        }),
    }
}

pub fn run_benchmark(config: &Config) -> Result<BenchReport, BenchError> {
    let shape = config.shape();
    let kernel = EscapeTimeKernel::new(config.viewport(), shape, config.max_iterations);
    let dispatcher = RowDispatcher::new(config.threads.count, config.threads.partition)?;
    run_benchmark_with(&kernel, &dispatcher, config.bench.runs, config.bench.verify)
}

/// Benchmarks any [`RowKernel`] against `dispatcher`.
pub fn run_benchmark_with<K: RowKernel>(
    kernel: &K,
    dispatcher: &RowDispatcher,
    runs: usize,
    check: bool,
) -> Result<BenchReport, BenchError> {
    let shape = kernel.shape();
    let mut serial_out = vec![0u32; shape.len()];
    let mut thread_out = vec![0u32; shape.len()];

    let serial = time_best_of(runs, || {
        serial_out.fill(0);
        mandelbrot_serial(kernel, 0, shape.height, &mut serial_out);
        Ok::<_, DispatchError>(())
    })?;
    info!("[mandelbrot serial]:\t\t[{:.3}] ms", serial.as_secs_f64() * 1000.0);

    let threaded = time_best_of(runs, || {
        thread_out.fill(0);
        dispatcher.run(kernel, &mut thread_out).map(|_| ())
    })?;
    info!("[mandelbrot thread]:\t\t[{:.3}] ms", threaded.as_secs_f64() * 1000.0);

    if check {
        if let Err(e) = verify(&serial_out, &thread_out, shape) {
            warn!("Threaded output does not match serial output: {}", e);
            return Err(e.into());
        }
    }

    Ok(BenchReport {
        num_threads: dispatcher.num_threads(),
        partition: dispatcher.partition(),
        serial,
        threaded,
    })
}
