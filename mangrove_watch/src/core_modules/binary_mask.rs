// THEORY:
// A `BinaryMask` marks pixels classified as "lost vegetation". Logically each
// cell is 0 or 1. Physically it is a `GrayImage` holding 0 or 255, which is the
// convention `imageproc` uses for its morphology and labelling operators, so the
// mask can be handed to them without conversion.
//
// Construction always normalizes: any non-zero input byte becomes 255. Readers
// never see intermediate values.

use image::{GrayImage, Luma};

/// Byte value stored for a set cell.
pub const FOREGROUND: u8 = 255;
/// Byte value stored for a clear cell.
pub const BACKGROUND: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    pixels: GrayImage,
}

impl BinaryMask {
    /// An all-clear mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    /// Builds a mask from a predicate evaluated at every coordinate.
    pub fn from_fn<F>(width: u32, height: u32, mut is_set: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let pixels = GrayImage::from_fn(width, height, |x, y| {
            if is_set(x, y) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });
        Self { pixels }
    }

    /// Wraps a grayscale image, treating every non-zero byte as set.
    pub fn from_gray(mut pixels: GrayImage) -> Self {
        for p in pixels.iter_mut() {
            if *p != BACKGROUND {
                *p = FOREGROUND;
            }
        }
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Whether the cell at (x, y) is set. Panics when out of bounds, like `GrayImage`.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y).0[0] != BACKGROUND
    }

    /// Number of set cells.
    pub fn count(&self) -> u64 {
        self.pixels.iter().filter(|&&p| p != BACKGROUND).count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.iter().all(|&p| p == BACKGROUND)
    }

    /// The underlying 0/255 image.
    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }
}
