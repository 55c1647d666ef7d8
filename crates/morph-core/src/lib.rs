//! # morph-core
//!
//! Particle morph engine and hand-tension estimator.
//!
//! Data flows one way: a [`LandmarkSource`] yields hand landmarks, the
//! [`TensionEstimator`] reduces them to one [`Interaction`] per frame, the
//! latest value travels through a [`latest_value_slot`], and the
//! [`MorphEngine`] reads it once per tick to pull its particles toward an
//! expanded, jittered version of the selected [`ShapeKind`].

pub mod color;
pub mod constants;
pub mod engine;
pub mod error;
pub mod shapes;
pub mod signal;
pub mod state;
pub mod status;
pub mod tension;
pub mod tracking;
pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");

pub use color::Rgb;
pub use constants::*;
pub use engine::{BufferChanges, ControlCommand, EngineParams, MorphEngine, ParticleBuffer, ShapeTargets};
pub use error::{MorphError, Result};
pub use shapes::ShapeKind;
pub use signal::{latest_value_slot, SignalReader, SignalWriter, TensionSink};
pub use state::Camera;
pub use status::{CaptureError, TensionBand, TensionStatus, Tracking};
pub use tension::{Calibration, HandLandmarks, Interaction, TensionEstimator};
pub use tracking::{LandmarkSource, SimulatedHands, TrackingHandle, TrackingWorker, UnavailableCamera};
