//! Multi-threaded Mandelbrot renderer.
//!
//! Image rows are statically partitioned across a fixed set of worker threads
//! (interleaved by default), each worker runs the escape-time kernel on its
//! rows, and the dispatcher joins everything before returning.

pub mod bench;
pub mod config;
pub mod dispatcher;
pub mod kernel;
pub mod partition;
pub mod view;

pub use dispatcher::{mandelbrot_thread, DispatchError, DispatchReport, RowDispatcher, MAX_THREADS};
pub use kernel::{EscapeTimeKernel, RowKernel};
pub use partition::Partition;
pub use view::{ImageShape, View, Viewport};
