// THEORY:
// Captures taken in different sessions rarely share brightness, contrast or
// white balance, even over ground that has not changed. Left alone, those tonal
// shifts would be read as vegetation change. The tone matcher removes them by
// reshaping each colour channel of the new image so that its intensity
// distribution follows the old image's distribution.
//
// Algorithm (per channel, independently):
// 1.  Histogram both images into 256 bins.
// 2.  For every intensity that actually occurs, compute its cumulative quantile
//     (running count / total pixels).
// 3.  Each source intensity is sent to the reference intensity found at the same
//     quantile, interpolating linearly between neighbouring reference quantiles
//     and clamping to the ends outside them.
// 4.  The interpolated value is truncated back to an 8-bit intensity.
//
// A channel that holds one single value has no distribution to reshape; matching
// it would simply replace its content with the reference's, so it is passed
// through untouched.

use image::RgbImage;
use log::debug;

const LEVELS: usize = 256;
const CHANNELS: usize = 3;

type Histogram = [u64; LEVELS];

/// Returns `source` with each channel's histogram matched to `reference`.
pub fn match_histograms(source: &RgbImage, reference: &RgbImage) -> RgbImage {
    let mut matched = source.clone();
    if source.width() == 0 || source.height() == 0 || reference.width() == 0 || reference.height() == 0 {
        return matched;
    }

    for channel in 0..CHANNELS {
        let source_histogram = channel_histogram(source, channel);
        let reference_histogram = channel_histogram(reference, channel);

        if present_levels(&source_histogram) < 2 {
            debug!("tone matching: channel {} is constant, passing through", channel);
            continue;
        }

        let lut = matching_lut(&source_histogram, &reference_histogram);
        for pixel in matched.pixels_mut() {
            pixel.0[channel] = lut[pixel.0[channel] as usize];
        }
    }

    matched
}

fn channel_histogram(image: &RgbImage, channel: usize) -> Histogram {
    let mut histogram = [0u64; LEVELS];
    for pixel in image.pixels() {
        histogram[pixel.0[channel] as usize] += 1;
    }
    histogram
}

fn present_levels(histogram: &Histogram) -> usize {
    histogram.iter().filter(|&&count| count > 0).count()
}

/// The intensities that occur in `histogram` and their cumulative quantiles.
fn cumulative_quantiles(histogram: &Histogram) -> (Vec<f64>, Vec<f64>) {
    let total: u64 = histogram.iter().sum();
    let mut values = Vec::new();
    let mut quantiles = Vec::new();
    let mut running = 0u64;
    for (level, &count) in histogram.iter().enumerate() {
        if count == 0 {
            continue;
        }
        running += count;
        values.push(level as f64);
        quantiles.push(running as f64 / total as f64);
    }
    (values, quantiles)
}

/// Builds the 256-entry lookup table that maps source intensities onto reference
/// intensities. Levels absent from the source keep their identity entry; they
/// are never looked up.
fn matching_lut(source: &Histogram, reference: &Histogram) -> [u8; LEVELS] {
    let (source_values, source_quantiles) = cumulative_quantiles(source);
    let (reference_values, reference_quantiles) = cumulative_quantiles(reference);

    let mut lut = [0u8; LEVELS];
    for (level, entry) in lut.iter_mut().enumerate() {
        *entry = level as u8;
    }
    for (value, quantile) in source_values.iter().zip(&source_quantiles) {
        let mapped = interpolate(*quantile, &reference_quantiles, &reference_values);
        // Truncation toward zero, clamped into the 8-bit range.
        lut[*value as usize] = mapped.clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Piecewise-linear interpolation of `x` over the increasing sample points `xp`
/// with values `fp`. Outside `[xp[0], xp[last]]` the end values are returned.
fn interpolate(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let (Some(&first_x), Some(&last_x)) = (xp.first(), xp.last()) else {
        return x;
    };
    if x <= first_x {
        return fp[0];
    }
    if x >= last_x {
        return fp[fp.len() - 1];
    }

    // First sample strictly greater than x; x lies in [xp[upper - 1], xp[upper]).
    let upper = xp.partition_point(|&sample| sample <= x);
    let lower = upper - 1;
    let (x0, x1) = (xp[lower], xp[upper]);
    let (y0, y1) = (fp[lower], fp[upper]);
    if x == x0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}
