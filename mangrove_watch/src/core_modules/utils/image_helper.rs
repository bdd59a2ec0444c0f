// THEORY:
// Reading and writing image files sits outside the pipeline proper. These helpers
// wrap the `image` crate's codecs and translate their failures into `LossError`,
// so callers learn which of the two inputs could not be used before any pixel is
// processed.

pub mod image_helper {
    use crate::error::{InputSlot, LossError};
    use image::{GrayImage, ImageError, RgbImage};
    use log::debug;
    use std::path::Path;

    /// Decodes any supported raster format into 8-bit RGB.
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage, ImageError> {
        let image = image::open(path.as_ref())?;
        debug!(
            "loaded {} ({}x{})",
            path.as_ref().display(),
            image.width(),
            image.height()
        );
        Ok(image.to_rgb8())
    }

    /// Loads the old and new images, failing with `InputNotFound` if either is
    /// missing, unreadable or empty.
    pub fn load_image_pair<P: AsRef<Path>, Q: AsRef<Path>>(
        old_path: P,
        new_path: Q,
    ) -> Result<(RgbImage, RgbImage), LossError> {
        let old = load_rgb(old_path.as_ref());
        let new = load_rgb(new_path.as_ref());

        match (old, new) {
            (Ok(old), Ok(new)) => {
                ensure_not_empty(&old, &new)?;
                Ok((old, new))
            }
            (old, new) => {
                let mut reasons = Vec::new();
                if let Err(e) = &old {
                    reasons.push(format!("{}: {}", old_path.as_ref().display(), e));
                }
                if let Err(e) = &new {
                    reasons.push(format!("{}: {}", new_path.as_ref().display(), e));
                }
                let slot = InputSlot::from_failures(old.is_err(), new.is_err()).unwrap_or(InputSlot::Both);
                Err(LossError::InputNotFound {
                    slot,
                    reason: reasons.join("; "),
                })
            }
        }
    }

    /// Rejects images with no pixels, naming the empty slot(s).
    pub fn ensure_not_empty(old: &RgbImage, new: &RgbImage) -> Result<(), LossError> {
        let is_empty = |image: &RgbImage| image.width() == 0 || image.height() == 0;
        match InputSlot::from_failures(is_empty(old), is_empty(new)) {
            None => Ok(()),
            Some(slot) => Err(LossError::InputNotFound {
                slot,
                reason: "image has zero width or height".to_string(),
            }),
        }
    }

    /// Creates `dir` and any missing parents.
    pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<(), LossError> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(())
    }

    /// Encodes an RGB image; the format follows the file extension.
    pub fn save_rgb<P: AsRef<Path>>(path: P, image: &RgbImage) -> Result<(), LossError> {
        image.save(path.as_ref()).map_err(|source| LossError::OutputWrite {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Encodes a grayscale image; the format follows the file extension.
    pub fn save_gray<P: AsRef<Path>>(path: P, image: &GrayImage) -> Result<(), LossError> {
        image.save(path.as_ref()).map_err(|source| LossError::OutputWrite {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::error::{InputSlot, LossError};
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("mangrove_watch_image_helper");
        std::fs::create_dir_all(&dir).expect("Error creating scratch dir.");
        dir.join(name)
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, (x + y) as u8]))
    }

    #[test]
    fn save_and_reload_png() {
        let path = scratch("gradient.png");
        let image = gradient(40, 30);
        save_rgb(&path, &image).expect("Error Saving File.");
        assert_eq!(load_rgb(&path).expect("Error Loading File."), image);
    }

    #[test]
    fn both_missing_inputs_are_reported() {
        let err = load_image_pair(scratch("missing_old.png"), scratch("missing_new.png")).unwrap_err();
        match err {
            LossError::InputNotFound { slot, reason } => {
                assert_eq!(slot, InputSlot::Both);
                assert!(reason.contains("missing_old.png"));
                assert!(reason.contains("missing_new.png"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn a_single_missing_input_is_named() {
        let old = scratch("present_old.png");
        save_rgb(&old, &gradient(8, 8)).expect("Error Saving File.");
        let err = load_image_pair(&old, scratch("absent_new.png")).unwrap_err();
        assert!(matches!(err, LossError::InputNotFound { slot: InputSlot::New, .. }));
    }

    #[test]
    fn undecodable_input_is_reported_as_not_found() {
        let garbage = scratch("garbage.png");
        std::fs::write(&garbage, b"definitely not a png").expect("Error writing file.");
        let new = scratch("present_new.png");
        save_rgb(&new, &gradient(8, 8)).expect("Error Saving File.");
        let err = load_image_pair(&garbage, &new).unwrap_err();
        assert!(matches!(err, LossError::InputNotFound { slot: InputSlot::Old, .. }));
    }

    #[test]
    fn empty_images_are_rejected() {
        let err = ensure_not_empty(&RgbImage::new(0, 5), &gradient(2, 2)).unwrap_err();
        assert!(matches!(err, LossError::InputNotFound { slot: InputSlot::Old, .. }));
        assert!(ensure_not_empty(&gradient(1, 1), &gradient(2, 2)).is_ok());
    }

    #[test]
    fn directories_are_created_recursively() {
        let dir = scratch("stages").join("nested");
        ensure_dir(&dir).expect("Error creating dir.");
        save_rgb(dir.join("stage.png"), &gradient(2, 2)).expect("Error Saving File.");
        assert!(dir.join("stage.png").exists());
    }

    #[test]
    fn unwritable_output_is_an_output_error() {
        let path = scratch("no_such_dir").join("nested").join("overlay.png");
        let err = save_rgb(&path, &gradient(2, 2)).unwrap_err();
        assert!(matches!(err, LossError::OutputWrite { .. }));
    }
}
