use image::{Rgb, RgbImage};
use mangrove_watch::core_modules::overlay::format_loss_label;
use mangrove_watch::{InputSlot, LossError, LossReport, PipelineConfig, detect, detect_files, image_helper};
use std::path::PathBuf;

const FOREST: Rgb<u8> = Rgb([34, 139, 34]);
const BARE: Rgb<u8> = Rgb([200, 40, 30]);

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("mangrove_watch_pipeline");
    std::fs::create_dir_all(&dir).expect("Error creating scratch dir.");
    dir.join(name)
}

/// Forest on the left half, bare ground on the right.
fn split_scene() -> RgbImage {
    RgbImage::from_fn(200, 100, |x, _| if x < 100 { FOREST } else { BARE })
}

/// `split_scene` with a 60x60 block of the forest cleared.
fn cleared_scene() -> RgbImage {
    RgbImage::from_fn(200, 100, |x, y| {
        let cleared = (20..80).contains(&x) && (20..80).contains(&y);
        if x < 100 && !cleared { FOREST } else { BARE }
    })
}

#[test]
fn identical_forest_shows_no_loss() {
    let image = RgbImage::from_pixel(200, 150, FOREST);
    let report = detect(&image, &image, &PipelineConfig::default()).unwrap();

    assert_eq!(report.loss_percentage(), 0.0);
    assert!(report.mask.is_empty());
    assert_eq!(format_loss_label(report.loss_percentage()), "Loss: 0.00%");

    // The label is drawn in white in the top-left corner.
    let lit = (0..60)
        .flat_map(|y| (0..200).map(move |x| (x, y)))
        .filter(|&(x, y)| *report.overlay.get_pixel(x, y) == Rgb([255, 255, 255]))
        .count();
    assert!(lit > 0, "no label pixels drawn");
    assert!(report.overlay.get_pixel(5, 5).0 != [255, 255, 255]);

    // Below the label the overlay is the dimmed input, with no red highlight.
    let dimmed = Rgb([24, 97, 24]);
    for y in 60..150 {
        for x in 0..200 {
            assert_eq!(*report.overlay.get_pixel(x, y), dimmed, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn forest_turned_bare_is_total_loss() {
    let old = RgbImage::from_pixel(200, 150, FOREST);
    let new = RgbImage::from_pixel(200, 150, BARE);
    let report = detect(&old, &new, &PipelineConfig::default()).unwrap();

    assert_eq!(report.loss_percentage(), 100.0);
    assert_eq!(report.mask.count(), 200 * 150);
    assert_eq!(*report.overlay.get_pixel(150, 120), Rgb([255, 28, 21]));
}

#[test]
fn single_pixel_frames_keep_their_loss() {
    for (width, height) in [(1, 1), (1, 4), (3, 1)] {
        let old = RgbImage::from_pixel(width, height, FOREST);
        let new = RgbImage::from_pixel(width, height, BARE);
        let config = PipelineConfig::default().with_min_area(0);
        let report = detect(&old, &new, &config).unwrap();
        assert_eq!(report.loss_percentage(), 100.0, "{width}x{height}");
        assert_eq!(report.mask.count(), u64::from(width * height));
    }
}

#[test]
fn cleared_block_is_reported_as_one_region() {
    let report = detect(&split_scene(), &cleared_scene(), &PipelineConfig::default()).unwrap();

    assert_eq!(report.loss.baseline_pixels, 100 * 100);
    let loss = report.loss_percentage();
    assert!(loss > 30.0 && loss < 45.0, "loss {loss}");

    assert_eq!(report.regions.len(), 1);
    let region = &report.regions[0];
    assert!((region.centroid.0 - 49.5).abs() < 2.0);
    assert!((region.centroid.1 - 49.5).abs() < 2.0);
    assert!(!report.mask.is_set(150, 50), "bare ground cannot be lost");
    assert!(!report.mask.is_set(5, 5), "untouched forest is not lost");
}

#[test]
fn raising_min_area_above_the_region_removes_it() {
    let config = PipelineConfig::default().with_min_area(10_000);
    let report = detect(&split_scene(), &cleared_scene(), &config).unwrap();
    assert!(report.mask.is_empty());
    assert_eq!(report.loss_percentage(), 0.0);
}

#[test]
fn runs_are_reproducible() {
    let config = PipelineConfig::default();
    let first = detect(&split_scene(), &cleared_scene(), &config).unwrap();
    let second = detect(&split_scene(), &cleared_scene(), &config).unwrap();
    assert_eq!(first.mask, second.mask);
    assert_eq!(first.loss, second.loss);
    assert_eq!(first.overlay, second.overlay);
}

#[test]
fn old_image_without_vegetation_reports_zero() {
    let old = RgbImage::from_pixel(80, 80, Rgb([255, 0, 0]));
    let new = RgbImage::from_fn(80, 80, |x, y| Rgb([(x * 3) as u8, (y * 3) as u8, 0]));
    let report = detect(&old, &new, &PipelineConfig::default()).unwrap();
    assert_eq!(report.loss.baseline_pixels, 0);
    assert_eq!(report.loss_percentage(), 0.0);
    assert_eq!(report.overlay.dimensions(), (80, 80));
}

#[test]
fn overlay_follows_the_old_image_size() {
    let old = RgbImage::from_pixel(160, 90, FOREST);
    let new = RgbImage::from_pixel(320, 240, BARE);
    let report = detect(&old, &new, &PipelineConfig::default()).unwrap();
    assert_eq!(report.overlay.dimensions(), (160, 90));
    assert_eq!(report.mask.dimensions(), (160, 90));
}

#[test]
fn invalid_threshold_is_rejected() {
    let image = RgbImage::from_pixel(10, 10, FOREST);
    let config = PipelineConfig::default().with_threshold(1.0);
    let err = detect(&image, &image, &config).unwrap_err();
    assert!(matches!(err, LossError::InvalidConfig(_)));
}

#[test]
fn files_end_to_end() {
    let old_path = scratch("old.png");
    let new_path = scratch("new.png");
    let output = scratch("overlay.png");
    image_helper::save_rgb(&old_path, &split_scene()).unwrap();
    image_helper::save_rgb(&new_path, &cleared_scene()).unwrap();

    let report = detect_files(&old_path, &new_path, &output, &PipelineConfig::default()).unwrap();
    let written = image_helper::load_rgb(&output).unwrap();
    assert_eq!(written, report.overlay);
    assert!(report.loss_percentage() > 0.0);
}

#[test]
fn jpeg_output_is_chosen_by_extension() {
    let old_path = scratch("jpeg_old.png");
    image_helper::save_rgb(&old_path, &split_scene()).unwrap();
    let output = scratch("output_mask.jpg");

    let report = detect_files(&old_path, &old_path, &output, &PipelineConfig::default()).unwrap();
    let written = image_helper::load_rgb(&output).unwrap();
    assert_eq!(written.dimensions(), report.overlay.dimensions());
}

fn slot(result: Result<LossReport, LossError>) -> InputSlot {
    match result {
        Err(LossError::InputNotFound { slot, .. }) => slot,
        Err(other) => panic!("expected InputNotFound, got {other}"),
        Ok(report) => panic!("expected InputNotFound, got a report with {:?}", report.loss),
    }
}

#[test]
fn missing_inputs_name_the_failing_slot() {
    let present = scratch("present.png");
    image_helper::save_rgb(&present, &split_scene()).unwrap();
    let missing = scratch("does_not_exist.png");
    let output = scratch("never_written.png");
    let config = PipelineConfig::default();

    assert_eq!(slot(detect_files(&missing, &present, &output, &config)), InputSlot::Old);
    assert_eq!(slot(detect_files(&present, &missing, &output, &config)), InputSlot::New);
    assert_eq!(slot(detect_files(&missing, &missing, &output, &config)), InputSlot::Both);
}
