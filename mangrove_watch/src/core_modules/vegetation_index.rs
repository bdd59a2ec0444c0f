// THEORY:
// The vegetation index is a single-pixel heuristic: live plants reflect more
// green than red, so the normalized green/red difference
//
//     raw = (G - R) / (G + R + eps)
//
// rises toward 1 over foliage and falls toward -1 over bare, reddish ground.
// This is not NDVI; true NDVI needs a near-infrared band that ordinary RGB
// captures do not have.
//
// The raw map is then min-max stretched so that it spans exactly [0, 1]. Each
// image is stretched on its own, which means the old and new maps do not share
// an absolute scale: two scenes with genuinely different raw ranges are pulled
// onto the same span before they are compared. This is a known limitation of the
// heuristic and is kept as is.
//
// A flat raw map (no range at all) cannot be stretched. It is mapped from the
// index's fixed theoretical range [-1, 1] instead, so a uniformly green scene
// still reads as vegetation and a uniformly red one does not.

use crate::core_modules::binary_mask::BinaryMask;
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use log::debug;

/// Single-channel floating-point grid.
pub type IndexImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Guards the ratio when both channels are (near) zero.
pub const RATIO_EPSILON: f32 = 1e-6;

/// Raw green/red ratio of one pixel, in (-1, 1).
#[inline]
pub fn green_red_ratio(pixel: &Rgb<u8>) -> f32 {
    let red = pixel.0[0] as f32 / 255.0;
    let green = pixel.0[1] as f32 / 255.0;
    (green - red) / (green + red + RATIO_EPSILON)
}

/// Normalized vegetation intensity of every pixel of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct VegetationIndexMap {
    values: IndexImage,
}

impl VegetationIndexMap {
    /// Computes the normalized index of `image`.
    pub fn from_image(image: &RgbImage) -> Self {
        let raw = IndexImage::from_fn(image.width(), image.height(), |x, y| {
            Luma([green_red_ratio(image.get_pixel(x, y))])
        });
        Self {
            values: normalize_min_max(raw),
        }
    }

    /// Wraps already-normalized values. Cells are clamped into [0, 1] and
    /// non-finite cells become 0.
    #[cfg(test)]
    pub(crate) fn from_normalized(mut values: IndexImage) -> Self {
        for v in values.iter_mut() {
            *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        }
        Self { values }
    }

    pub fn width(&self) -> u32 {
        self.values.width()
    }

    pub fn height(&self) -> u32 {
        self.values.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.values.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values.get_pixel(x, y).0[0]
    }

    /// Cells whose index is at or above `threshold`: the "vegetation present" mask.
    pub fn presence_mask(&self, threshold: f32) -> BinaryMask {
        binarize(&self.values, threshold)
    }

    /// 8-bit rendering (0..=255) for diagnostics.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([(self.get(x, y) * 255.0).round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Sets every cell whose value is `>= threshold`.
pub fn binarize(values: &IndexImage, threshold: f32) -> BinaryMask {
    BinaryMask::from_fn(values.width(), values.height(), |x, y| {
        values.get_pixel(x, y).0[0] >= threshold
    })
}

/// Linearly rescales `raw` so its minimum maps to 0 and its maximum to 1.
fn normalize_min_max(mut raw: IndexImage) -> IndexImage {
    let Some((min, max)) = value_range(&raw) else {
        return raw;
    };
    let span = max - min;

    if span > f32::EPSILON {
        debug!("vegetation index: raw range [{:.4}, {:.4}]", min, max);
        for v in raw.iter_mut() {
            *v = ((*v - min) / span).clamp(0.0, 1.0);
        }
    } else {
        debug!("vegetation index: flat raw map at {:.4}, using fixed range", min);
        for v in raw.iter_mut() {
            *v = ((*v + 1.0) / 2.0).clamp(0.0, 1.0);
        }
    }
    raw
}

fn value_range(values: &IndexImage) -> Option<(f32, f32)> {
    values.iter().fold(None, |range, &v| match range {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}
