// THEORY:
// The overlay label only ever needs a short line such as "Loss: 12.34%", so a
// full font stack (TrueType parsing, a font file on disk) would be far heavier
// than the job. Instead the label is drawn with a tiny single-stroke vector font
// in the Hershey tradition: each glyph is a handful of polylines on a grid whose
// cap height is 21 units, and text is rendered by stroking those polylines.
//
// Rendering is anti-aliased: each pixel's coverage is derived from its distance
// to the nearest stroke segment, with a one-pixel soft edge, and the text colour
// is blended in proportionally. A scale of 1.0 maps one grid unit to one pixel.
//
// Coordinates inside a glyph run right (x) and down (y) from the top of the cap
// height; y = 21 is the baseline. Characters without a glyph advance the pen by
// the width of a space.

use image::{Rgb, RgbImage};

/// Cap height in grid units.
pub const CAP_HEIGHT: f32 = 21.0;
/// Pen advance for characters without a glyph.
const SPACE_ADVANCE: f32 = 16.0;

type Stroke = &'static [(i8, i8)];

struct Glyph {
    advance: f32,
    strokes: &'static [Stroke],
}

const DOT: Stroke = &[(1, 20), (2, 21), (3, 20), (2, 19), (1, 20)];

fn glyph(c: char) -> Option<Glyph> {
    let (advance, strokes): (f32, &'static [Stroke]) = match c {
        '0' => (
            20.0,
            &[&[
                (6, 0), (3, 1), (1, 4), (0, 9), (0, 12), (1, 17), (3, 20), (6, 21), (8, 21), (11, 20),
                (13, 17), (14, 12), (14, 9), (13, 4), (11, 1), (8, 0), (6, 0),
            ]],
        ),
        '1' => (20.0, &[&[(3, 4), (5, 3), (8, 0), (8, 21)]]),
        '2' => (
            20.0,
            &[&[
                (1, 5), (1, 4), (2, 2), (3, 1), (5, 0), (9, 0), (11, 1), (12, 2), (13, 4), (13, 6),
                (12, 8), (10, 11), (0, 21), (14, 21),
            ]],
        ),
        '3' => (
            20.0,
            &[&[
                (2, 0), (13, 0), (7, 8), (10, 8), (12, 9), (13, 10), (14, 13), (14, 15), (13, 18),
                (11, 20), (8, 21), (5, 21), (2, 20), (1, 19), (0, 17),
            ]],
        ),
        '4' => (20.0, &[&[(10, 0), (0, 14), (15, 14)], &[(10, 0), (10, 21)]]),
        '5' => (
            20.0,
            &[&[
                (12, 0), (2, 0), (1, 9), (2, 8), (5, 7), (8, 7), (11, 8), (13, 10), (14, 13), (14, 15),
                (13, 18), (11, 20), (8, 21), (5, 21), (2, 20), (1, 19), (0, 17),
            ]],
        ),
        '6' => (
            20.0,
            &[&[
                (13, 3), (12, 1), (9, 0), (7, 0), (4, 1), (2, 4), (1, 9), (1, 14), (2, 18), (4, 20),
                (7, 21), (8, 21), (11, 20), (13, 18), (14, 15), (14, 14), (13, 11), (11, 9), (8, 8),
                (7, 8), (4, 9), (2, 11), (1, 14),
            ]],
        ),
        '7' => (20.0, &[&[(0, 0), (14, 0), (4, 21)]]),
        '8' => (
            20.0,
            &[&[
                (5, 0), (2, 1), (1, 3), (1, 5), (2, 7), (4, 8), (8, 9), (11, 10), (13, 12), (14, 14),
                (14, 17), (13, 19), (12, 20), (9, 21), (5, 21), (2, 20), (1, 19), (0, 17), (0, 14),
                (1, 12), (3, 10), (6, 9), (10, 8), (12, 7), (13, 5), (13, 3), (12, 1), (9, 0), (5, 0),
            ]],
        ),
        '9' => (
            20.0,
            &[&[
                (13, 7), (12, 10), (10, 12), (7, 13), (6, 13), (3, 12), (1, 10), (0, 7), (0, 6), (1, 3),
                (3, 1), (6, 0), (7, 0), (10, 1), (12, 3), (13, 7), (13, 12), (12, 17), (10, 20), (7, 21),
                (5, 21), (2, 20), (1, 18),
            ]],
        ),
        '.' => (10.0, &[DOT]),
        ':' => (10.0, &[&[(1, 8), (2, 9), (3, 8), (2, 7), (1, 8)], DOT]),
        '%' => (
            24.0,
            &[
                &[(17, 0), (1, 21)],
                &[(4, 0), (1, 1), (0, 4), (1, 7), (4, 8), (7, 7), (8, 4), (7, 1), (4, 0)],
                &[(14, 13), (11, 14), (10, 17), (11, 20), (14, 21), (17, 20), (18, 17), (17, 14), (14, 13)],
            ],
        ),
        '-' => (18.0, &[&[(0, 12), (12, 12)]]),
        'L' => (17.0, &[&[(0, 0), (0, 21), (12, 21)]]),
        'o' => (
            19.0,
            &[&[
                (6, 7), (3, 8), (1, 10), (0, 13), (0, 15), (1, 18), (3, 20), (6, 21), (8, 21), (11, 20),
                (13, 18), (14, 15), (14, 13), (13, 10), (11, 8), (8, 7), (6, 7),
            ]],
        ),
        's' => (
            17.0,
            &[&[
                (12, 10), (11, 8), (8, 7), (5, 7), (2, 8), (1, 10), (2, 12), (4, 13), (9, 14), (11, 15),
                (12, 17), (12, 18), (11, 20), (8, 21), (5, 21), (2, 20), (1, 18),
            ]],
        ),
        _ => return None,
    };
    Some(Glyph { advance, strokes })
}

/// How a line of text is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Pixels per grid unit.
    pub scale: f32,
    pub color: Rgb<u8>,
    /// Stroke width in pixels.
    pub thickness: f32,
}

type Segment = ((f32, f32), (f32, f32));

/// Lays `text` out as pixel-space segments with `origin` at the left end of the baseline.
fn layout(text: &str, origin: (i32, i32), scale: f32) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pen = 0.0f32;
    for c in text.chars() {
        let Some(g) = glyph(c) else {
            pen += SPACE_ADVANCE;
            continue;
        };
        let to_pixel = |&(gx, gy): &(i8, i8)| {
            (
                origin.0 as f32 + (pen + gx as f32) * scale,
                origin.1 as f32 - (CAP_HEIGHT - gy as f32) * scale,
            )
        };
        for stroke in g.strokes {
            let points: Vec<(f32, f32)> = stroke.iter().map(to_pixel).collect();
            for pair in points.windows(2) {
                segments.push((pair[0], pair[1]));
            }
        }
        pen += g.advance;
    }
    segments
}

fn distance_to_segment(p: (f32, f32), segment: &Segment) -> f32 {
    let ((ax, ay), (bx, by)) = *segment;
    let (dx, dy) = (bx - ax, by - ay);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq > 0.0 {
        (((p.0 - ax) * dx + (p.1 - ay) * dy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Draws `text` onto `canvas` with its baseline starting at `origin`.
/// Anything falling outside the canvas is clipped.
pub fn draw_text_mut(canvas: &mut RgbImage, text: &str, origin: (i32, i32), style: &TextStyle) {
    let segments = layout(text, origin, style.scale);
    if segments.is_empty() || canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let radius = (style.thickness / 2.0).max(0.5);
    let reach = radius + 1.0;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for ((ax, ay), (bx, by)) in &segments {
        min_x = min_x.min(ax.min(*bx));
        min_y = min_y.min(ay.min(*by));
        max_x = max_x.max(ax.max(*bx));
        max_y = max_y.max(ay.max(*by));
    }
    let x0 = (min_x - reach).floor().max(0.0) as u32;
    let y0 = (min_y - reach).floor().max(0.0) as u32;
    let x1 = ((max_x + reach).ceil().max(0.0) as u32).min(canvas.width() - 1);
    let y1 = ((max_y + reach).ceil().max(0.0) as u32).min(canvas.height() - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = (x as f32, y as f32);
            let distance = segments
                .iter()
                .map(|s| distance_to_segment(p, s))
                .fold(f32::MAX, f32::min);
            let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let pixel = canvas.get_pixel_mut(x, y);
            for (channel, target) in pixel.0.iter_mut().zip(style.color.0) {
                let blended = *channel as f32 * (1.0 - coverage) + target as f32 * coverage;
                *channel = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
