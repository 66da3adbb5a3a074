// src/kernel/tests.rs

use super::*;
use crate::view::View;
use test_log::test;

fn small_kernel() -> EscapeTimeKernel {
    EscapeTimeKernel::new(View::Full.viewport(), ImageShape::new(48, 32), 64)
}

fn serial_image(kernel: &EscapeTimeKernel) -> Vec<u32> {
    let mut out = vec![0; kernel.shape.len()];
    mandelbrot_serial(kernel, 0, kernel.shape.height, &mut out);
    out
}

#[test]
fn origin_never_escapes() {
    assert_eq!(escape_time(0.0, 0.0, 256), 256);
    // c = -1 cycles between -1 and 0.
    assert_eq!(escape_time(-1.0, 0.0, 256), 256);
}

#[test]
fn far_points_escape_immediately() {
    assert_eq!(escape_time(3.0, 0.0, 256), 0);
    assert_eq!(escape_time(0.0, -2.5, 256), 0);
}

#[test]
fn c_equal_one_escapes_after_two_iterations() {
    // z: 1 -> 2 -> 5; |5|^2 > 4 is seen at the start of iteration 2.
    assert_eq!(escape_time(1.0, 0.0, 256), 2);
}

#[test]
fn zero_iterations_yields_zero() {
    assert_eq!(escape_time(0.0, 0.0, 0), 0);
}

#[test]
fn row_samples_left_edge_at_x0() {
    let kernel = small_kernel();
    let mut row = vec![0; kernel.shape.width];
    let mid = kernel.shape.height / 2;
    kernel.compute_row(mid, &mut row);

    let (_, dy) = kernel.viewport.step(kernel.shape);
    let y = kernel.viewport.y0 + mid as f32 * dy;
    assert_eq!(row[0], escape_time(kernel.viewport.x0, y, kernel.max_iterations));
    assert!(row.iter().all(|&n| n <= kernel.max_iterations));
    assert!(row.iter().any(|&n| n == kernel.max_iterations));
}

#[test]
fn serial_band_leaves_other_rows_untouched() {
    let kernel = small_kernel();
    let width = kernel.shape.width;
    let mut out = vec![u32::MAX; kernel.shape.len()];
    mandelbrot_serial(&kernel, 4, 3, &mut out);

    let full = serial_image(&kernel);
    for row in 0..kernel.shape.height {
        let got = &out[row * width..(row + 1) * width];
        if (4..7).contains(&row) {
            assert_eq!(got, &full[row * width..(row + 1) * width]);
        } else {
            assert!(got.iter().all(|&n| n == u32::MAX), "row {} was written", row);
        }
    }
}

#[test]
fn serial_band_is_clamped_to_image() {
    let kernel = small_kernel();
    let mut out = vec![0; kernel.shape.len()];
    mandelbrot_serial(&kernel, kernel.shape.height - 2, usize::MAX, &mut out);
    mandelbrot_serial(&kernel, kernel.shape.height + 5, 10, &mut out);
}

#[test]
fn interleaved_calls_cover_image_once() {
    let kernel = small_kernel();
    let expected = serial_image(&kernel);

    for num_threads in [1, 2, 3, 5, 7, 32, 40] {
        let mut out = vec![u32::MAX; kernel.shape.len()];
        for thread_id in 0..num_threads {
            mandelbrot_serial_interleave(&kernel, thread_id, num_threads, &mut out);
        }
        assert_eq!(out, expected, "num_threads = {}", num_threads);
    }
}

#[test]
fn interleave_touches_only_its_rows() {
    let kernel = small_kernel();
    let width = kernel.shape.width;
    let mut out = vec![u32::MAX; kernel.shape.len()];
    mandelbrot_serial_interleave(&kernel, 1, 4, &mut out);

    for row in 0..kernel.shape.height {
        let written = out[row * width..(row + 1) * width]
            .iter()
            .any(|&n| n != u32::MAX);
        assert_eq!(written, row % 4 == 1, "row {}", row);
    }
}

#[test]
#[should_panic(expected = "num_threads must be at least 1")]
fn interleave_rejects_zero_threads() {
    let kernel = small_kernel();
    let mut out = vec![0; kernel.shape.len()];
    mandelbrot_serial_interleave(&kernel, 0, 0, &mut out);
}
