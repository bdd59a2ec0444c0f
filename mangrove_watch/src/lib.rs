// THEORY:
// This file is the main entry point for the `mangrove_watch` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `visual_tester` CLI).
//
// The primary goal is to export `detect` / `detect_files` and their associated
// data structures (`PipelineConfig`, `LossReport`, etc.) as the clean, high-level
// interface for the whole change detector. The individual stages live in
// `core_modules` and stay public so that callers and tests can run a single stage
// on its own, but a normal consumer never needs to touch them.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use crate::core_modules::utils::image_helper::image_helper;
pub use crate::error::{InputSlot, LossError};
pub use crate::pipeline::{LossReport, PipelineConfig, StageImages, detect, detect_files};
