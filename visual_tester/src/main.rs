use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::Logger;
use log::{debug, info};
use mangrove_watch::core_modules::binary_mask::BinaryMask;
use mangrove_watch::image_helper;
use mangrove_watch::pipeline::{DEFAULT_MIN_AREA, DEFAULT_THRESHOLD, LossReport, PipelineConfig, detect_files};
use std::path::{Path, PathBuf};

/// Highlights vegetation lost between two images of the same area.
#[derive(Parser, Debug)]
#[command(name = "visual_tester")]
#[command(version, about, long_about = None)]
struct Args {
    /// The earlier ("before") image
    old_image: PathBuf,

    /// The later ("after") image
    new_image: PathBuf,

    /// Where to write the highlighted overlay; the extension picks the format
    #[arg(short, long, default_value = "output_mask.jpg")]
    output: PathBuf,

    /// Smoothed index drop at or above which a pixel counts as lost
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Loss regions must be larger than this many pixels
    #[arg(short, long, default_value_t = DEFAULT_MIN_AREA)]
    min_area: u32,

    /// Also write the final binary loss mask
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Write every intermediate stage image into this directory
    #[arg(long)]
    stages_dir: Option<PathBuf>,

    /// Log level filter, e.g. "debug" or "mangrove_watch=debug"; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str(&args.log_level)
        .context("invalid log level filter")?
        .start()
        .context("failed to start logger")?;

    // --- 1. Configuration ---
    let config = PipelineConfig::default()
        .with_threshold(args.threshold)
        .with_min_area(args.min_area);
    debug!("running with {:?}", config);

    // --- 2. Detection ---
    let report = detect_files(&args.old_image, &args.new_image, &args.output, &config).with_context(|| {
        format!(
            "vegetation loss detection failed for {} -> {}",
            args.old_image.display(),
            args.new_image.display()
        )
    })?;

    // --- 3. Optional diagnostics ---
    if let Some(mask_path) = &args.mask {
        write_mask(mask_path, &report.mask)?;
        info!("Saved binary loss mask to {}", mask_path.display());
    }
    if let Some(dir) = &args.stages_dir {
        write_stages(dir, &report)?;
        info!("Saved stage images to {}", dir.display());
    }

    // --- 4. Summary ---
    println!("Saved vegetation loss mask to {}", args.output.display());
    println!("Estimated Mangrove Loss: {:.2}%", report.loss_percentage());
    print_regions(&report);

    Ok(())
}

fn write_mask(path: &Path, mask: &BinaryMask) -> Result<()> {
    image_helper::save_gray(path, mask.as_gray())
        .with_context(|| format!("could not write mask {}", path.display()))
}

fn write_stages(dir: &Path, report: &LossReport) -> Result<()> {
    image_helper::ensure_dir(dir).with_context(|| format!("could not create {}", dir.display()))?;
    let stages = &report.stages;
    image_helper::save_rgb(dir.join("1_aligned_new.png"), &stages.aligned_new)?;
    image_helper::save_gray(dir.join("2_old_index.png"), &stages.old_index.to_gray())?;
    image_helper::save_gray(dir.join("3_new_index.png"), &stages.new_index.to_gray())?;
    image_helper::save_gray(dir.join("4_thresholded.png"), stages.thresholded.as_gray())?;
    image_helper::save_gray(dir.join("5_cleaned.png"), stages.cleaned.as_gray())?;
    image_helper::save_gray(dir.join("6_final_mask.png"), report.mask.as_gray())?;
    Ok(())
}

fn print_regions(report: &LossReport) {
    if report.regions.is_empty() {
        println!("No loss regions above the minimum area.");
        return;
    }
    println!(
        "{} loss region(s), {} of {} baseline pixels:",
        report.regions.len(),
        report.loss.lost_pixels,
        report.loss.baseline_pixels
    );
    for region in &report.regions {
        let (top_left, bottom_right) = region.bounding_box;
        println!(
            "  #{:<3} area {:>8} px  box ({}, {})-({}, {})  centroid ({:.1}, {:.1})",
            region.id,
            region.area,
            top_left.x,
            top_left.y,
            bottom_right.x,
            bottom_right.y,
            region.centroid.0,
            region.centroid.1
        );
    }
}
