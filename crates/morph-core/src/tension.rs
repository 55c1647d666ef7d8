//! Hand tension estimation.
//!
//! Turns the landmark sets of every tracked hand in one analysed camera frame
//! into a single [`Interaction`]: the mean closedness of the hands, or
//! [`Interaction::Absent`] when no hand is in view.
//!
//! Closedness comes from how far the five fingertips sit from the wrist,
//! normalised by the wrist-to-middle-knuckle distance so the estimate does
//! not depend on how close the hand is to the camera.

use glam::Vec3;

use crate::constants::{
    CLOSED_HAND_RATIO, FINGERTIPS, HAND_LANDMARK_COUNT, MIDDLE_MCP, MIN_HAND_SCALE,
    OPEN_HAND_RATIO, WRIST,
};
use crate::error::{MorphError, Result};

// ════════════════════════════════════════════════════════════════════════════
// Interaction signal
// ════════════════════════════════════════════════════════════════════════════

/// One frame's interaction input.
///
/// `Absent` means no hand is tracked and is deliberately distinct from
/// `Tension(0.0)`, an open hand.
///
/// Build values with [`Interaction::tension`]. A hand-built `Tension` is
/// still read through [`Interaction::value`], which clamps it and treats NaN
/// as absent, so consumers only ever see \[0, 1\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Absent,
    Tension(f32),
}

impl Interaction {
    /// A tension level clamped into \[0, 1\]. NaN is treated as absent.
    pub fn tension(value: f32) -> Self {
        if value.is_nan() {
            Interaction::Absent
        } else {
            Interaction::Tension(value.clamp(0.0, 1.0))
        }
    }

    pub fn is_present(self) -> bool {
        self.value().is_some()
    }

    /// The tension in \[0, 1\], or `None` when no hand is tracked.
    pub fn value(self) -> Option<f32> {
        match self {
            Interaction::Tension(t) if !t.is_nan() => Some(t.clamp(0.0, 1.0)),
            _ => None,
        }
    }

    /// Value the engine smooths toward: absent relaxes to 0.
    pub fn target(self) -> f32 {
        self.value().unwrap_or(0.0)
    }
}

impl From<Option<f32>> for Interaction {
    fn from(v: Option<f32>) -> Self {
        v.map_or(Interaction::Absent, Interaction::tension)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmarks
// ════════════════════════════════════════════════════════════════════════════

/// The 21 landmarks of one detected hand in normalised image coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Vec3; HAND_LANDMARK_COUNT],
}

impl HandLandmarks {
    /// Validate a raw landmark list: exactly 21 points, all finite.
    pub fn new(points: &[Vec3]) -> Result<Self> {
        let points: [Vec3; HAND_LANDMARK_COUNT] =
            points.try_into().map_err(|_| MorphError::LandmarkCount {
                expected: HAND_LANDMARK_COUNT,
                found: points.len(),
            })?;
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(MorphError::NonFiniteLandmark { index });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Vec3; HAND_LANDMARK_COUNT] {
        &self.points
    }

    /// Wrist to middle-finger base knuckle.
    pub fn hand_scale(&self) -> f32 {
        self.points[WRIST].distance(self.points[MIDDLE_MCP])
    }

    pub fn mean_tip_distance(&self) -> f32 {
        let wrist = self.points[WRIST];
        let total: f32 = FINGERTIPS
            .iter()
            .map(|&tip| self.points[tip].distance(wrist))
            .sum();
        total / FINGERTIPS.len() as f32
    }

    /// Mean tip distance over hand scale, or `None` for a degenerate hand.
    pub fn openness_ratio(&self) -> Option<f32> {
        let scale = self.hand_scale();
        (scale > MIN_HAND_SCALE).then(|| self.mean_tip_distance() / scale)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Estimator
// ════════════════════════════════════════════════════════════════════════════

/// Openness ratios that map to tension 0 and tension 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub open_ratio: f32,
    pub closed_ratio: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            open_ratio: OPEN_HAND_RATIO,
            closed_ratio: CLOSED_HAND_RATIO,
        }
    }
}

impl Calibration {
    /// Linear map from openness ratio to tension, clamped to \[0, 1\].
    pub fn tension_for_ratio(&self, ratio: f32) -> f32 {
        let span = self.open_ratio - self.closed_ratio;
        if span.abs() <= f32::EPSILON || !ratio.is_finite() {
            return 0.0;
        }
        ((self.open_ratio - ratio) / span).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TensionEstimator {
    pub calibration: Calibration,
}

impl TensionEstimator {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    /// Tension of a single hand. Degenerate hands count as fully open.
    pub fn hand_tension(&self, hand: &HandLandmarks) -> f32 {
        match hand.openness_ratio() {
            Some(ratio) => self.calibration.tension_for_ratio(ratio),
            None => {
                log::debug!("[tension] degenerate hand scale, counting as open");
                0.0
            }
        }
    }

    /// Mean tension over all hands, or absent when there are none.
    pub fn estimate(&self, hands: &[HandLandmarks]) -> Interaction {
        if hands.is_empty() {
            return Interaction::Absent;
        }
        let total: f32 = hands.iter().map(|h| self.hand_tension(h)).sum();
        Interaction::tension(total / hands.len() as f32)
    }

    /// Like [`estimate`](Self::estimate) but over unvalidated landmark lists.
    /// Malformed hands are skipped; if none survive the result is absent.
    pub fn estimate_raw<P: AsRef<[Vec3]>>(&self, hands: &[P]) -> Interaction {
        let valid: Vec<HandLandmarks> = hands
            .iter()
            .filter_map(|raw| match HandLandmarks::new(raw.as_ref()) {
                Ok(h) => Some(h),
                Err(e) => {
                    log::debug!("[tension] skipping hand: {e}");
                    None
                }
            })
            .collect();
        self.estimate(&valid)
    }
}
