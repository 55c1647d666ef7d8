//! Error types for the morph core

use thiserror::Error;

use crate::status::CaptureError;

/// Result type for morph core operations
pub type Result<T> = std::result::Result<T, MorphError>;

/// Errors surfaced at the crate's input boundaries.
///
/// None of these are fatal to the render loop: callers skip the offending
/// hand, keep the current color, or fall back to the absent signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MorphError {
    #[error("invalid color {0:?}: expected #rrggbb")]
    InvalidColor(String),

    #[error("hand has {found} landmarks, expected {expected}")]
    LandmarkCount { expected: usize, found: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
}
