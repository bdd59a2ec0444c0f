// THEORY:
// The overlay is the one visual artifact of a run. It shows the (aligned,
// tone-matched) new image with every lost-vegetation pixel pushed toward red,
// plus the estimate printed in the top-left corner.
//
// The highlight is composited as a weighted sum: 0.7 of the base image plus 0.9
// of a layer that is pure red under the mask and black elsewhere. The weights do
// not add up to 1, so highlighted pixels are over-brightened on purpose and
// saturate toward full red; unmasked pixels are simply dimmed to 70%.

use crate::core_modules::binary_mask::BinaryMask;
use crate::core_modules::stroke_font::{self, TextStyle};
use image::{Rgb, RgbImage};

/// Colour painted under the loss mask, in the images' R,G,B order.
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Weight of the base image in the blend.
pub const BASE_WEIGHT: f32 = 0.7;
/// Weight of the highlight layer in the blend.
pub const HIGHLIGHT_WEIGHT: f32 = 0.9;
/// Left end of the label's baseline, in pixels.
pub const LABEL_ORIGIN: (i32, i32) = (20, 40);
pub const LABEL_STYLE: TextStyle = TextStyle {
    scale: 1.2,
    color: Rgb([255, 255, 255]),
    thickness: 3.0,
};

/// Black image with `HIGHLIGHT_COLOR` wherever `mask` is set.
pub fn highlight_layer(mask: &BinaryMask) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.is_set(x, y) { HIGHLIGHT_COLOR } else { Rgb([0, 0, 0]) }
    })
}

/// Per-channel `a * alpha + b * beta + gamma`, rounded and saturated to 8 bits.
///
/// Both images must have the same dimensions.
pub fn add_weighted(a: &RgbImage, alpha: f32, b: &RgbImage, beta: f32, gamma: f32) -> RgbImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let pa = a.get_pixel(x, y).0;
        let pb = b.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| {
            let v = pa[c] as f32 * alpha + pb[c] as f32 * beta + gamma;
            v.round_ties_even().clamp(0.0, 255.0) as u8
        }))
    })
}

/// The label text for a loss percentage.
pub fn format_loss_label(percentage: f64) -> String {
    format!("Loss: {percentage:.2}%")
}

/// Composites the loss mask onto `new_image` and prints the estimate.
pub fn render(new_image: &RgbImage, mask: &BinaryMask, percentage: f64) -> RgbImage {
    let highlight = highlight_layer(mask);
    let mut overlay = add_weighted(new_image, BASE_WEIGHT, &highlight, HIGHLIGHT_WEIGHT, 0.0);
    stroke_font::draw_text_mut(
        &mut overlay,
        &format_loss_label(percentage),
        LABEL_ORIGIN,
        &LABEL_STYLE,
    );
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_uses_two_decimals() {
        assert_eq!(format_loss_label(0.0), "Loss: 0.00%");
        assert_eq!(format_loss_label(12.345_6), "Loss: 12.35%");
        assert_eq!(format_loss_label(100.0), "Loss: 100.00%");
    }

    #[test]
    fn highlight_layer_marks_mask_in_red() {
        let mask = BinaryMask::from_fn(3, 1, |x, _| x == 1);
        let layer = highlight_layer(&mask);
        assert_eq!(*layer.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*layer.get_pixel(1, 0), HIGHLIGHT_COLOR);
    }

    #[test]
    fn weighted_sum_saturates() {
        let base = RgbImage::from_pixel(1, 1, Rgb([200, 100, 0]));
        let layer = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let blended = add_weighted(&base, BASE_WEIGHT, &layer, HIGHLIGHT_WEIGHT, 0.0);
        assert_eq!(*blended.get_pixel(0, 0), Rgb([255, 70, 0]));
    }

    #[test]
    fn unmasked_pixels_are_dimmed_and_masked_ones_turn_red() {
        let base = RgbImage::from_pixel(200, 120, Rgb([100, 200, 50]));
        let mask = BinaryMask::from_fn(200, 120, |x, y| x >= 100 && y >= 80);
        let overlay = render(&base, &mask, 42.0);
        assert_eq!(overlay.dimensions(), (200, 120));
        assert_eq!(*overlay.get_pixel(10, 100), Rgb([70, 140, 35]));
        assert_eq!(*overlay.get_pixel(150, 100), Rgb([255, 140, 35]));
    }

    #[test]
    fn label_is_drawn_in_the_top_left() {
        let base = RgbImage::new(200, 120);
        let overlay = render(&base, &BinaryMask::new(200, 120), 0.0);
        let lit = (0..60).flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|&(x, y)| overlay.get_pixel(x, y).0[0] > 0)
            .count();
        assert!(lit > 0);
        assert!((61..120).all(|y| (0..200).all(|x| overlay.get_pixel(x, y).0 == [0, 0, 0])));
    }
}
