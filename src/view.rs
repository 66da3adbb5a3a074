//! Complex-plane viewports and output image geometry.

use serde::{Deserialize, Serialize};

/// Row-major image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    pub width: usize,
    pub height: usize,
}

impl ImageShape {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixels in the image.
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rectangle of the complex plane mapped onto the image.
///
/// `(x0, y0)` is sampled by pixel `(0, 0)`; `(x1, y1)` is the far corner and
/// is never sampled itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Viewport {
    /// The whole set: x in [-2, 1], y in [-1, 1].
    pub const FULL: Viewport = Viewport {
        x0: -2.0,
        y0: -1.0,
        x1: 1.0,
        y1: 1.0,
    };

    /// Scales every bound by `scale`, then translates by `(shift_x, shift_y)`.
    pub fn scale_and_shift(self, scale: f32, shift_x: f32, shift_y: f32) -> Self {
        Viewport {
            x0: self.x0 * scale + shift_x,
            y0: self.y0 * scale + shift_y,
            x1: self.x1 * scale + shift_x,
            y1: self.y1 * scale + shift_y,
        }
    }

    /// Per-pixel step along each axis for `shape`.
    pub fn step(&self, shape: ImageShape) -> (f32, f32) {
        let dx = (self.x1 - self.x0) / shape.width as f32;
        let dy = (self.y1 - self.y0) / shape.height as f32;
        (dx, dy)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::FULL
    }
}

/// Named viewport presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// View 1: the full set.
    #[default]
    Full,
    /// View 2: a zoom into the seahorse valley region.
    Zoomed,
}

impl View {
    /// Maps the numeric preset ids accepted on the command line.
    pub fn from_index(index: u8) -> Option<View> {
        match index {
            1 => Some(View::Full),
            2 => Some(View::Zoomed),
            _ => None,
        }
    }

    pub fn viewport(self) -> Viewport {
        match self {
            View::Full => Viewport::FULL,
            View::Zoomed => Viewport::FULL.scale_and_shift(0.015, -0.986, 0.30),
        }
    }
}
