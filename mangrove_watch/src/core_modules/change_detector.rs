// THEORY:
// The change detector turns two vegetation index maps into a first, noisy loss
// mask. It only ever looks for loss: where the new index is higher than the old
// one (regrowth, seasonal greening) the difference is clipped to zero, keeping
// the tool single-purpose.
//
// Steps:
// 1.  Difference: old - new, per cell, negatives set to 0.
// 2.  Smoothing: a 5x5 Gaussian (binomial weights 1 4 6 4 1, applied
//     separably) suppresses pixel-level noise before binarization. Cells past
//     the frame repeat the nearest edge cell, so a uniform field stays uniform
//     right up to the frame edge.
// 3.  Binarization: cells at or above the threshold become foreground.

use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::vegetation_index::{IndexImage, VegetationIndexMap, binarize};
use image::Luma;
use imageproc::filter::separable_filter_equal;
use log::debug;

/// Normalized 5-tap Gaussian weights.
pub const SMOOTHING_KERNEL: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

/// Per-cell `max(old - new, 0)`.
///
/// Both maps must have identical dimensions; the pipeline guarantees this by
/// aligning the images first.
pub fn difference(old: &VegetationIndexMap, new: &VegetationIndexMap) -> IndexImage {
    debug_assert_eq!(old.dimensions(), new.dimensions());
    IndexImage::from_fn(old.width(), old.height(), |x, y| {
        Luma([(old.get(x, y) - new.get(x, y)).max(0.0)])
    })
}

/// Separable Gaussian smoothing with `SMOOTHING_KERNEL`.
pub fn smooth(values: &IndexImage) -> IndexImage {
    if values.width() == 0 || values.height() == 0 {
        return values.clone();
    }
    separable_filter_equal(values, &SMOOTHING_KERNEL)
}

/// Difference, smoothing and binarization in one pass.
pub fn loss_mask(old: &VegetationIndexMap, new: &VegetationIndexMap, threshold: f32) -> BinaryMask {
    let smoothed = smooth(&difference(old, new));
    let mask = binarize(&smoothed, threshold);
    debug!(
        "change detector: {} of {} cells at or above {:.3}",
        mask.count(),
        u64::from(mask.width()) * u64::from(mask.height()),
        threshold
    );
    mask
}
