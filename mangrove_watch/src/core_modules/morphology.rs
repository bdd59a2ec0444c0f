// THEORY:
// Morphological cleanup tidies the raw loss mask before regions are measured.
//
// - Opening (erode, then dilate) removes isolated speckles that are smaller than
//   the structuring element.
// - Closing (dilate, then erode) fills small gaps and pinholes inside genuine
//   loss regions.
//
// Each of the four steps is repeated twice with a 5x5 all-ones square
// (chessboard distance <= 2). Opening always runs first: closing a noisy mask
// would merge speckles into larger blobs before they could be removed.
//
// Erosion never eats into the mask from outside the frame; only background
// pixels inside the image count. Likewise dilation only grows from foreground
// inside the image. A mask with no background at all is left alone by erosion,
// and one with no foreground is left alone by dilation, whatever its size.

use crate::core_modules::binary_mask::{BACKGROUND, BinaryMask};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

/// Chessboard radius of the square structuring element (5x5).
pub const STRUCTURING_RADIUS: u8 = 2;
/// Repetitions of each erosion / dilation step.
pub const ITERATIONS: usize = 2;

fn repeat(image: GrayImage, step: fn(&GrayImage, Norm, u8) -> GrayImage) -> GrayImage {
    (0..ITERATIONS).fold(image, |acc, _| step(&acc, Norm::LInf, STRUCTURING_RADIUS))
}

// `erode` and `dilate` measure distances inside the frame only and cap them on
// tiny images, so the degenerate all-set / all-clear inputs are handled here.
fn erode_step(image: &GrayImage, norm: Norm, k: u8) -> GrayImage {
    if image.pixels().all(|p| p.0[0] != BACKGROUND) {
        return image.clone();
    }
    erode(image, norm, k)
}

fn dilate_step(image: &GrayImage, norm: Norm, k: u8) -> GrayImage {
    if image.pixels().all(|p| p.0[0] == BACKGROUND) {
        return image.clone();
    }
    dilate(image, norm, k)
}

/// Erosion followed by dilation.
pub fn open(mask: &BinaryMask) -> BinaryMask {
    let eroded = repeat(mask.as_gray().clone(), erode_step);
    BinaryMask::from_gray(repeat(eroded, dilate_step))
}

/// Dilation followed by erosion.
pub fn close(mask: &BinaryMask) -> BinaryMask {
    let dilated = repeat(mask.as_gray().clone(), dilate_step);
    BinaryMask::from_gray(repeat(dilated, erode_step))
}

/// Opening then closing.
pub fn clean(mask: &BinaryMask) -> BinaryMask {
    close(&open(mask))
}
