//! # Escape-time kernel
//!
//! Computes Mandelbrot iteration counts one image row at a time.
//!
//! ## Sampling
//!
//! Pixel `(i, j)` samples the complex point
//!
//! ```text
//! c = (x0 + i * dx, y0 + j * dy)
//! dx = (x1 - x0) / width
//! dy = (y1 - y0) / height
//! ```
//!
//! and stores the number of iterations of `z <- z^2 + c` (starting at
//! `z = c`) performed before `|z|^2` exceeds 4, capped at `max_iterations`.
//!
//! ## Memory Layout
//!
//! Output buffers are row-major: pixel `(i, j)` lives at `j * width + i`.
//! A row is always written as a whole, which is what lets the dispatcher hand
//! disjoint row slices to different threads.
//!
//! ## Drivers
//!
//! - [`mandelbrot_serial`]: a contiguous band of rows.
//! - [`mandelbrot_serial_interleave`]: every `num_threads`-th row starting at
//!   `thread_id`. Calling it once for each id in `0..num_threads` covers the
//!   image exactly once.

use crate::view::{ImageShape, Viewport};

/// A computation that fills image rows independently of one another.
///
/// Implementors are shared by reference across worker threads, so they must be
/// `Sync` and must not rely on rows being computed in any particular order.
pub trait RowKernel: Sync {
    /// Dimensions of the image this kernel renders.
    fn shape(&self) -> ImageShape;

    /// Writes row `row` into `out`, which is exactly `shape().width` long.
    fn compute_row(&self, row: usize, out: &mut [u32]);
}

/// Iteration count for the point `c_re + i*c_im`.
#[inline]
pub fn escape_time(c_re: f32, c_im: f32, max_iterations: u32) -> u32 {
    let mut z_re = c_re;
    let mut z_im = c_im;
    let mut i = 0;
    while i < max_iterations {
        if z_re * z_re + z_im * z_im > 4.0 {
            break;
        }
        let new_re = z_re * z_re - z_im * z_im;
        let new_im = 2.0 * z_re * z_im;
        z_re = c_re + new_re;
        z_im = c_im + new_im;
        i += 1;
    }
    i
}

/// The standard escape-time Mandelbrot renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeTimeKernel {
    pub viewport: Viewport,
    pub shape: ImageShape,
    pub max_iterations: u32,
}

impl EscapeTimeKernel {
    pub fn new(viewport: Viewport, shape: ImageShape, max_iterations: u32) -> Self {
        Self {
            viewport,
            shape,
            max_iterations,
        }
    }
}

impl RowKernel for EscapeTimeKernel {
    fn shape(&self) -> ImageShape {
        self.shape
    }

    fn compute_row(&self, row: usize, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.shape.width);
        let (dx, dy) = self.viewport.step(self.shape);
        let y = self.viewport.y0 + row as f32 * dy;
        for (i, pixel) in out.iter_mut().enumerate() {
            let x = self.viewport.x0 + i as f32 * dx;
            *pixel = escape_time(x, y, self.max_iterations);
        }
    }
}

/// Computes rows `[start_row, start_row + num_rows)` into the full-image
/// buffer `output`. Rows past the bottom of the image are ignored.
///
/// # Panics
/// Panics if `output` is shorter than the kernel's image.
pub fn mandelbrot_serial<K: RowKernel + ?Sized>(
    kernel: &K,
    start_row: usize,
    num_rows: usize,
    output: &mut [u32],
) {
    let shape = kernel.shape();
    let end_row = start_row.saturating_add(num_rows).min(shape.height);
    for row in start_row..end_row {
        let offset = row * shape.width;
        kernel.compute_row(row, &mut output[offset..offset + shape.width]);
    }
}

/// Computes rows `thread_id, thread_id + num_threads, ...` into the
/// full-image buffer `output`.
///
/// # Panics
/// Panics if `num_threads` is zero or `output` is shorter than the image.
pub fn mandelbrot_serial_interleave<K: RowKernel + ?Sized>(
    kernel: &K,
    thread_id: usize,
    num_threads: usize,
    output: &mut [u32],
) {
    assert!(num_threads > 0, "num_threads must be at least 1");
    let shape = kernel.shape();
    for row in (thread_id..shape.height).step_by(num_threads) {
        let offset = row * shape.width;
        kernel.compute_row(row, &mut output[offset..offset + shape.width]);
    }
}

#[cfg(test)]
mod tests;
