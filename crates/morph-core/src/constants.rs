use glam::Vec3;

// Shared tuning constants used by the engine, the estimator and the frontends.

// Particle buffer
pub const DEFAULT_PARTICLE_COUNT: usize = 20_000;
pub const INITIAL_SPREAD: f32 = 10.0; // side of the cube particles start scattered in

// Morph step
pub const INTERACTION_SMOOTHING: f32 = 0.1; // new = old + α * (target - old), per tick
pub const REFERENCE_TICK_HZ: f32 = 60.0; // rate the per-tick factors were tuned at
pub const EXPANSION_GAIN: f32 = 2.0; // expansion = 1 + smoothed * gain
pub const JITTER_THRESHOLD: f32 = 0.1; // smoothed tension above which targets get noise
pub const FOLLOW_RATE: f32 = 0.1; // fraction of remaining distance covered per tick
pub const ROTATION_PER_TICK: f32 = 0.002; // radians about +Y

// Color
pub const DEFAULT_BASE_COLOR: [f32; 3] = [1.0, 0.0, 0x55 as f32 / 255.0]; // #ff0055
pub const COLOR_JITTER: f32 = 0.1; // per-channel uniform jitter half-width

// Hand tension calibration (mean tip distance / hand scale)
pub const OPEN_HAND_RATIO: f32 = 2.2;
pub const CLOSED_HAND_RATIO: f32 = 0.9;
pub const MIN_HAND_SCALE: f32 = 1e-6;

// Hand landmark layout
pub const HAND_LANDMARK_COUNT: usize = 21;
pub const WRIST: usize = 0;
pub const MIDDLE_MCP: usize = 9;
pub const FINGERTIPS: [usize; 5] = [4, 8, 12, 16, 20]; // thumb, index, middle, ring, pinky

// Status display bands
pub const TENSION_BAND_LOW: f32 = 0.3;
pub const TENSION_BAND_HIGH: f32 = 0.7;

// Camera
pub const CAMERA_Z: f32 = 15.0;
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const POINT_SIZE: f32 = 0.2; // world-space sprite size

#[inline]
pub fn camera_eye() -> Vec3 {
    Vec3::new(0.0, 0.0, CAMERA_Z)
}
