pub mod alignment;
pub mod binary_mask;
pub mod change_detector;
pub mod loss_estimator;
pub mod morphology;
pub mod overlay;
pub mod region_filter;
pub mod stroke_font;
pub mod tone_matcher;
pub mod utils;
pub mod vegetation_index;
