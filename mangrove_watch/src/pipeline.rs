// THEORY:
// The `pipeline` module is the top-level API for the change detector. It strings
// the stages together into a single call that takes two co-registered images of
// the same area (old, new) and returns an actionable `LossReport`.
//
// The stages run strictly in order, each consuming only values produced before it:
//
//   1. Alignment: the new image is resized onto the old image's grid.
//   2. Tone matching: the aligned new image is histogram-matched to the old one.
//   3. Vegetation index: both images become normalized green/red index maps.
//   4. Change detection: the index drop is smoothed and thresholded.
//   5. Morphology: the raw mask is opened, then closed.
//   6. Region filter: regions at or below the minimum area are discarded.
//   7. Loss estimate: lost pixels relative to the old image's vegetation.
//   8. Overlay: the final mask and the estimate are drawn onto the new image.
//
// Every call derives all of its state from its arguments, so the same inputs
// always give bit-identical results. Configuration and input errors are raised
// before any pixel is touched.

use crate::core_modules::alignment::align_to_reference;
use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::change_detector::loss_mask;
use crate::core_modules::loss_estimator::{LossEstimate, estimate_loss};
use crate::core_modules::morphology;
use crate::core_modules::overlay;
use crate::core_modules::region_filter::filter_by_area;
use crate::core_modules::tone_matcher::match_histograms;
use crate::core_modules::utils::image_helper::image_helper;
use crate::core_modules::vegetation_index::VegetationIndexMap;
use crate::error::LossError;
use image::RgbImage;
use log::{debug, info};
use std::path::Path;

// Re-export key data structures for the public API.
pub use crate::core_modules::region_filter::{LossRegion, Point};

/// Index drop treated as loss when none is configured.
pub const DEFAULT_THRESHOLD: f32 = 0.15;
/// Minimum region area, in pixels, when none is configured.
pub const DEFAULT_MIN_AREA: u32 = 300;

/// Tunable parameters of a detection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Smoothed index drop at or above which a pixel counts as lost. Also the
    /// index level at which a pixel of the old image counts as vegetation.
    /// Must lie strictly between 0 and 1.
    pub threshold_value: f32,
    /// Regions must be strictly larger than this many pixels to be kept.
    pub min_area: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold_value: DEFAULT_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
        }
    }
}

impl PipelineConfig {
    pub fn with_threshold(mut self, threshold_value: f32) -> Self {
        self.threshold_value = threshold_value;
        self
    }

    pub fn with_min_area(mut self, min_area: u32) -> Self {
        self.min_area = min_area;
        self
    }

    /// Rejects parameters the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), LossError> {
        let t = self.threshold_value;
        if !t.is_finite() || t <= 0.0 || t >= 1.0 {
            return Err(LossError::InvalidConfig(format!(
                "threshold_value must lie strictly between 0 and 1, got {t}"
            )));
        }
        Ok(())
    }
}

/// Intermediate products of a run, kept for inspection.
#[derive(Debug, Clone)]
pub struct StageImages {
    /// The new image after alignment and tone matching.
    pub aligned_new: RgbImage,
    pub old_index: VegetationIndexMap,
    pub new_index: VegetationIndexMap,
    /// The loss mask straight out of thresholding.
    pub thresholded: BinaryMask,
    /// The thresholded mask after opening and closing.
    pub cleaned: BinaryMask,
}

/// The complete result of one detection run.
#[derive(Debug, Clone)]
pub struct LossReport {
    pub loss: LossEstimate,
    /// Final loss mask, on the old image's grid.
    pub mask: BinaryMask,
    /// Regions that survived the area filter, in raster order.
    pub regions: Vec<LossRegion>,
    /// The new image with loss highlighted in red and the estimate printed.
    pub overlay: RgbImage,
    pub stages: StageImages,
}

impl LossReport {
    /// Estimated vegetation loss in percent, in [0, 100].
    pub fn loss_percentage(&self) -> f64 {
        self.loss.percentage
    }
}

/// Runs the full detection pipeline on two already-loaded images.
pub fn detect(old: &RgbImage, new: &RgbImage, config: &PipelineConfig) -> Result<LossReport, LossError> {
    config.validate()?;
    image_helper::ensure_not_empty(old, new)?;

    // Stage 1 & 2: Geometric and radiometric alignment
    let aligned = align_to_reference(old, new);
    let aligned_new = match_histograms(&aligned, old);

    // Stage 3: Vegetation index
    let old_index = VegetationIndexMap::from_image(old);
    let new_index = VegetationIndexMap::from_image(&aligned_new);

    // Stage 4: Change detection
    let thresholded = loss_mask(&old_index, &new_index, config.threshold_value);

    // Stage 5: Morphological cleanup
    let cleaned = morphology::clean(&thresholded);
    debug!(
        "pipeline: {} thresholded pixels, {} after cleanup",
        thresholded.count(),
        cleaned.count()
    );

    // Stage 6: Region filtering
    let filtered = filter_by_area(&cleaned, config.min_area);

    // Stage 7 & 8: Estimate and overlay
    let loss = estimate_loss(&old_index, &filtered.mask, config.threshold_value);
    let overlay = overlay::render(&aligned_new, &filtered.mask, loss.percentage);

    Ok(LossReport {
        loss,
        mask: filtered.mask,
        regions: filtered.regions,
        overlay,
        stages: StageImages {
            aligned_new,
            old_index,
            new_index,
            thresholded,
            cleaned,
        },
    })
}

/// Loads both images, runs `detect` and writes the overlay to `output_path`.
///
/// The output format follows the extension of `output_path`.
pub fn detect_files<P, Q, R>(
    old_path: P,
    new_path: Q,
    output_path: R,
    config: &PipelineConfig,
) -> Result<LossReport, LossError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    config.validate()?;
    let (old, new) = image_helper::load_image_pair(old_path, new_path)?;
    let report = detect(&old, &new, config)?;

    image_helper::save_rgb(output_path.as_ref(), &report.overlay)?;
    info!("Saved vegetation loss mask to {}", output_path.as_ref().display());
    info!("Estimated Mangrove Loss: {:.2}%", report.loss_percentage());
    Ok(report)
}
