// THEORY:
// The loss estimate relates the area flagged as lost to the area that held
// vegetation to begin with. The baseline is the old index map thresholded at the
// same value used for change detection. If that baseline is empty there is
// nothing that could have been lost: the estimate is 0% and the pipeline carries
// on normally. The division guard is an invariant, not an incidental check; the
// estimate is never NaN or infinite, and it is kept within [0, 100].

use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::vegetation_index::VegetationIndexMap;
use log::{info, warn};

/// Outcome of the loss estimation stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossEstimate {
    /// Foreground pixels of the final loss mask.
    pub lost_pixels: u64,
    /// Vegetation pixels of the old image at the detection threshold.
    pub baseline_pixels: u64,
    /// `100 * lost / baseline`, or 0 when the baseline is empty. In [0, 100].
    pub percentage: f64,
}

impl LossEstimate {
    /// True when the old image showed no vegetation at the threshold.
    pub fn is_degenerate_baseline(&self) -> bool {
        self.baseline_pixels == 0
    }
}

/// Estimates the percentage of the old image's vegetation covered by `final_mask`.
pub fn estimate_loss(old_index: &VegetationIndexMap, final_mask: &BinaryMask, threshold: f32) -> LossEstimate {
    let baseline_pixels = old_index.presence_mask(threshold).count();
    let lost_pixels = final_mask.count();
    let estimate = from_counts(lost_pixels, baseline_pixels);

    if estimate.is_degenerate_baseline() {
        warn!("loss estimator: old image has no vegetation at threshold {:.3}, reporting 0%", threshold);
    } else {
        info!(
            "loss estimator: {} lost of {} baseline pixels ({:.2}%)",
            lost_pixels, baseline_pixels, estimate.percentage
        );
    }
    estimate
}

/// The estimate for raw pixel counts.
pub fn from_counts(lost_pixels: u64, baseline_pixels: u64) -> LossEstimate {
    let percentage = if baseline_pixels > 0 {
        (lost_pixels as f64 / baseline_pixels as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    LossEstimate {
        lost_pixels,
        baseline_pixels,
        percentage,
    }
}
