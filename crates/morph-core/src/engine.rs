use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec3};
use rand::prelude::*;

use crate::color::Rgb;
use crate::constants::{
    COLOR_JITTER, DEFAULT_PARTICLE_COUNT, EXPANSION_GAIN, FOLLOW_RATE, INITIAL_SPREAD,
    INTERACTION_SMOOTHING, JITTER_THRESHOLD, REFERENCE_TICK_HZ, ROTATION_PER_TICK,
};
use crate::shapes::ShapeKind;
use crate::tension::Interaction;

/// Fire-and-forget commands from the UI collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlCommand {
    SelectShape(ShapeKind),
    SelectColor(Rgb),
}

#[derive(Clone, Debug)]
pub struct EngineParams {
    pub particle_count: usize,
    pub initial_shape: ShapeKind,
    pub base_color: Rgb,
    pub smoothing: f32,
    pub expansion_gain: f32,
    pub jitter_threshold: f32,
    pub follow_rate: f32,
    pub rotation_per_tick: f32,
    /// Rescale `smoothing` by elapsed time instead of applying it once per
    /// tick. Off by default so the feel matches a 60 Hz display exactly.
    pub frame_rate_independent: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            initial_shape: ShapeKind::Heart,
            base_color: Rgb::default(),
            smoothing: INTERACTION_SMOOTHING,
            expansion_gain: EXPANSION_GAIN,
            jitter_threshold: JITTER_THRESHOLD,
            follow_rate: FOLLOW_RATE,
            rotation_per_tick: ROTATION_PER_TICK,
            frame_rate_independent: false,
        }
    }
}

/// Positions and colors of every particle, index-stable for the engine's
/// lifetime. This is the read-only view handed to the renderer.
#[derive(Clone, Debug, Default)]
pub struct ParticleBuffer {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Rgb>,
}

impl ParticleBuffer {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Which parts of the buffer changed since the renderer last looked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferChanges {
    pub positions: bool,
    pub colors: bool,
}

impl BufferChanges {
    pub fn any(self) -> bool {
        self.positions || self.colors
    }
}

/// Immutable per-particle destinations for one shape.
///
/// Selecting a shape builds a fresh set and swaps the `Arc`; anything still
/// holding the previous set keeps seeing it whole.
pub type ShapeTargets = Arc<[Vec3]>;

// Independent random streams so a color change never perturbs shape sampling.
const STREAM_SHAPE: u64 = 0;
const STREAM_COLOR: u64 = 1;
const STREAM_JITTER: u64 = 2;

fn stream_rng(seed: u64, stream: u64) -> StdRng {
    let mix = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mix)
}

pub struct MorphEngine {
    pub params: EngineParams,
    buffer: ParticleBuffer,
    targets: ShapeTargets,
    shape: ShapeKind,
    base_color: Rgb,
    smoothed: f32,
    rotation_y: f32,
    changes: BufferChanges,
    shape_rng: StdRng,
    color_rng: StdRng,
    jitter_rng: StdRng,
}

impl MorphEngine {
    pub fn new(params: EngineParams, seed: u64) -> Self {
        let n = params.particle_count;
        let mut shape_rng = stream_rng(seed, STREAM_SHAPE);
        let half = INITIAL_SPREAD / 2.0;
        let positions = (0..n)
            .map(|_| {
                Vec3::new(
                    shape_rng.gen_range(-half..=half),
                    shape_rng.gen_range(-half..=half),
                    shape_rng.gen_range(-half..=half),
                )
            })
            .collect::<Vec<_>>();
        let base_color = params.base_color;
        let initial_shape = params.initial_shape;
        let mut engine = Self {
            buffer: ParticleBuffer {
                positions,
                colors: vec![base_color; n],
            },
            targets: Arc::from(Vec::<Vec3>::new()),
            shape: initial_shape,
            base_color,
            smoothed: 0.0,
            rotation_y: 0.0,
            changes: BufferChanges {
                positions: true,
                colors: true,
            },
            shape_rng,
            color_rng: stream_rng(seed, STREAM_COLOR),
            jitter_rng: stream_rng(seed, STREAM_JITTER),
            params,
        };
        engine.select_shape(initial_shape);
        log::info!(
            "[engine] particles={} shape={} color={}",
            n,
            initial_shape,
            base_color
        );
        engine
    }

    pub fn with_defaults(seed: u64) -> Self {
        Self::new(EngineParams::default(), seed)
    }

    // ---------------- Commands ----------------

    pub fn apply(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::SelectShape(kind) => self.select_shape(kind),
            ControlCommand::SelectColor(color) => self.select_color(color),
        }
    }

    /// Retarget every particle at `kind`. Positions are left alone; the
    /// morph happens over the following ticks.
    pub fn select_shape(&mut self, kind: ShapeKind) {
        let points = kind.generate(self.buffer.len(), &mut self.shape_rng);
        debug_assert_eq!(points.len(), self.buffer.len());
        self.targets = Arc::from(points);
        self.shape = kind;
        log::debug!("[engine] shape -> {kind}");
    }

    pub fn select_shape_by_name(&mut self, name: &str) {
        self.select_shape(ShapeKind::from_name_or_default(name));
    }

    /// Recolor every particle immediately: `color` plus small per-channel
    /// noise, clamped.
    pub fn select_color(&mut self, color: Rgb) {
        self.base_color = color;
        let rng = &mut self.color_rng;
        for c in self.buffer.colors.iter_mut() {
            *c = color.jittered(COLOR_JITTER, rng);
        }
        self.changes.colors = true;
        log::debug!("[engine] color -> {color}");
    }

    // ---------------- Per-frame update ----------------

    pub fn tick(&mut self, interaction: Interaction, dt: Duration) {
        let alpha = self.smoothing_factor(dt);
        self.smoothed += (interaction.target() - self.smoothed) * alpha;
        let smoothed = self.smoothed;

        let expansion = self.expansion_factor();
        let follow = self.params.follow_rate;
        let jitter = (smoothed > self.params.jitter_threshold).then_some(smoothed * 0.5);

        let targets = Arc::clone(&self.targets);
        let rng = &mut self.jitter_rng;
        for (pos, target) in self.buffer.positions.iter_mut().zip(targets.iter()) {
            let mut goal = *target * expansion;
            if let Some(half) = jitter {
                goal += Vec3::new(
                    rng.gen_range(-half..=half),
                    rng.gen_range(-half..=half),
                    rng.gen_range(-half..=half),
                );
            }
            *pos += (goal - *pos) * follow;
        }

        self.rotation_y = (self.rotation_y + self.params.rotation_per_tick) % std::f32::consts::TAU;
        self.changes.positions = true;
    }

    fn smoothing_factor(&self, dt: Duration) -> f32 {
        let alpha = self.params.smoothing.clamp(0.0, 1.0);
        if !self.params.frame_rate_independent {
            return alpha;
        }
        let ticks = dt.as_secs_f32() * REFERENCE_TICK_HZ;
        1.0 - (1.0 - alpha).powf(ticks)
    }

    // ---------------- Render view ----------------

    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    /// Return and clear the change flags; the renderer re-uploads whatever
    /// was set.
    pub fn take_changes(&mut self) -> BufferChanges {
        std::mem::take(&mut self.changes)
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Rigid presentation rotation about +Y.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }

    // ---------------- Introspection ----------------

    pub fn particle_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn targets(&self) -> ShapeTargets {
        Arc::clone(&self.targets)
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn base_color(&self) -> Rgb {
        self.base_color
    }

    pub fn smoothed_interaction(&self) -> f32 {
        self.smoothed
    }

    pub fn expansion_factor(&self) -> f32 {
        1.0 + self.smoothed * self.params.expansion_gain
    }
}
