// THEORY:
// Every failure the pipeline can report is gathered in `LossError`. The pipeline
// itself is deterministic arithmetic over already-loaded pixels, so the only
// things that can go wrong are at the edges: an input that cannot be read, a
// configuration that makes no sense, or an output that cannot be written.
//
// A baseline with no vegetation is deliberately absent from this list. It is an
// ordinary outcome (0% loss) and is reported through `LossEstimate` instead.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Identifies which of the two inputs could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    /// The earlier ("before") image.
    Old,
    /// The later ("after") image.
    New,
    /// Neither image could be used.
    Both,
}

impl InputSlot {
    /// Combines the load outcome of both inputs. `None` means both loaded.
    pub fn from_failures(old_failed: bool, new_failed: bool) -> Option<Self> {
        match (old_failed, new_failed) {
            (true, true) => Some(InputSlot::Both),
            (true, false) => Some(InputSlot::Old),
            (false, true) => Some(InputSlot::New),
            (false, false) => None,
        }
    }
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSlot::Old => write!(f, "old"),
            InputSlot::New => write!(f, "new"),
            InputSlot::Both => write!(f, "old and new"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LossError {
    /// One or both inputs are missing, unreadable or empty. Raised before any
    /// pixel processing.
    #[error("{slot} input image not found or unreadable: {reason}")]
    InputNotFound { slot: InputSlot, reason: String },

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write image to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
