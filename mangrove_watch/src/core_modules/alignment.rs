// THEORY:
// Geometric alignment is the first stage and the simplest. The two captures are
// assumed to frame the same ground, so the "new" image is stretched to the exact
// width and height of the "old" one. There is no cropping, no aspect-ratio
// preservation and no registration; any distortion introduced by the stretch is
// accepted. Every later stage relies on both images sharing dimensions.

use image::RgbImage;
use image::imageops::{self, FilterType};
use log::{debug, warn};

/// Bilinear resampling, the usual default for screenshot-style imagery.
pub const RESAMPLING_FILTER: FilterType = FilterType::Triangle;

/// Returns `image` resized to the dimensions of `reference`.
pub fn align_to_reference(reference: &RgbImage, image: &RgbImage) -> RgbImage {
    let (width, height) = reference.dimensions();
    if image.dimensions() == (width, height) {
        debug!("alignment: dimensions already match ({}x{})", width, height);
        return image.clone();
    }

    warn!(
        "alignment: resizing new image from {}x{} to {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    imageops::resize(image, width, height, RESAMPLING_FILTER)
}
