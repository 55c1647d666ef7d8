//! Status values pushed to the display collaborator.
//!
//! These types avoid any platform UI API; a frontend turns them into a
//! tension bar, a label, or a window title.

use std::fmt;

use thiserror::Error;

use crate::color::Rgb;
use crate::constants::{TENSION_BAND_HIGH, TENSION_BAND_LOW};
use crate::tension::Interaction;

/// Why the camera/tracking device could not be acquired.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera found")]
    NotFound,

    #[error("camera is in use by another application")]
    InUse,

    #[error("{0}")]
    Unknown(String),
}

impl CaptureError {
    /// Map a loose category name (as typed on the command line or reported
    /// by a device layer) to a variant.
    pub fn from_category(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "permission" | "permission-denied" | "denied" => CaptureError::PermissionDenied,
            "not-found" | "notfound" | "missing" => CaptureError::NotFound,
            "in-use" | "inuse" | "busy" => CaptureError::InUse,
            other => CaptureError::Unknown(other.to_string()),
        }
    }
}

/// Coarse tension level used to color the tension bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TensionBand {
    Low,
    Medium,
    High,
}

impl TensionBand {
    pub fn for_tension(t: f32) -> Self {
        if t < TENSION_BAND_LOW {
            TensionBand::Low
        } else if t < TENSION_BAND_HIGH {
            TensionBand::Medium
        } else {
            TensionBand::High
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TensionBand::Low => "low",
            TensionBand::Medium => "medium",
            TensionBand::High => "high",
        }
    }

    pub fn color(self) -> Rgb {
        let hex = match self {
            TensionBand::Low => "#00ff88",
            TensionBand::Medium => "#ffaa00",
            TensionBand::High => "#ff0055",
        };
        Rgb::from_hex(hex).unwrap_or_default()
    }
}

impl fmt::Display for TensionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracking state as shown to the user.
#[derive(Clone, Debug, PartialEq)]
pub enum Tracking {
    Active,
    NoHand,
    Failed(CaptureError),
}

impl fmt::Display for Tracking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tracking::Active => f.write_str("Tracking Active"),
            Tracking::NoHand => f.write_str("No Hand Detected"),
            Tracking::Failed(e) => write!(f, "Tracking Failed: {e}"),
        }
    }
}

/// One estimation's worth of display state.
#[derive(Clone, Debug, PartialEq)]
pub struct TensionStatus {
    pub interaction: Interaction,
    pub tracking: Tracking,
}

impl TensionStatus {
    pub fn from_interaction(interaction: Interaction) -> Self {
        let tracking = if interaction.is_present() {
            Tracking::Active
        } else {
            Tracking::NoHand
        };
        Self {
            interaction,
            tracking,
        }
    }

    pub fn failed(err: CaptureError) -> Self {
        Self {
            interaction: Interaction::Absent,
            tracking: Tracking::Failed(err),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking == Tracking::Active
    }

    /// Bar fill in percent, 0 when no hand is tracked.
    pub fn percent(&self) -> f32 {
        (self.interaction.target() * 100.0).clamp(0.0, 100.0)
    }

    pub fn band(&self) -> TensionBand {
        TensionBand::for_tension(self.interaction.target())
    }
}

impl fmt::Display for TensionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interaction.value() {
            Some(_) => write!(
                f,
                "Tension {:>3.0}% [{}] | {}",
                self.percent(),
                self.band(),
                self.tracking
            ),
            None => write!(f, "Tension   - | {}", self.tracking),
        }
    }
}
