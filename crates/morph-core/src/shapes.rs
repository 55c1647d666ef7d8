//! Procedural target shapes.
//!
//! Every generator is a pure function of the particle count and the random
//! source it is handed: it returns exactly `count` points centred on the
//! origin and touches nothing else. Sphere-based shapes all sample
//! directions with [`unit_sphere_direction`] so density matches across them.

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use rand::Rng;
use thiserror::Error;

/// The closed set of target shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    #[default]
    Heart,
    Flower,
    Saturn,
    MeditatingFigure,
    Starburst,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Heart,
        ShapeKind::Flower,
        ShapeKind::Saturn,
        ShapeKind::MeditatingFigure,
        ShapeKind::Starburst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Heart => "heart",
            ShapeKind::Flower => "flower",
            ShapeKind::Saturn => "saturn",
            ShapeKind::MeditatingFigure => "meditating-figure",
            ShapeKind::Starburst => "starburst",
        }
    }

    /// Look up a shape by name, falling back to [`ShapeKind::Heart`] for
    /// anything unrecognised.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("[shapes] unknown shape {name:?}, using heart");
            ShapeKind::default()
        })
    }

    /// Generate this shape's target set.
    pub fn generate<R: Rng + ?Sized>(self, count: usize, rng: &mut R) -> Vec<Vec3> {
        match self {
            ShapeKind::Heart => heart(count, rng),
            ShapeKind::Flower => flower(count, rng),
            ShapeKind::Saturn => saturn(count, rng),
            ShapeKind::MeditatingFigure => meditating_figure(count, rng),
            ShapeKind::Starburst => starburst(count, rng),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown shape {0:?}")]
pub struct UnknownShape(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "heart" => Ok(ShapeKind::Heart),
            "flower" => Ok(ShapeKind::Flower),
            "saturn" => Ok(ShapeKind::Saturn),
            "meditating-figure" | "meditatingfigure" | "buddha" => Ok(ShapeKind::MeditatingFigure),
            "starburst" | "fireworks" => Ok(ShapeKind::Starburst),
            _ => Err(UnknownShape(s.to_string())),
        }
    }
}

// ---------------- Sampling ----------------

/// Uniform direction on the unit sphere.
///
/// Azimuth is uniform in \[0, 2π) and the polar angle is `acos(U(-1, 1))`;
/// a uniform polar angle would crowd the poles.
#[inline]
pub fn unit_sphere_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let azimuth = rng.gen_range(0.0..TAU);
    let polar = rng.gen_range(-1.0f32..=1.0).acos();
    let (sin_p, cos_p) = polar.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    Vec3::new(sin_p * cos_a, sin_p * sin_a, cos_p)
}

// ---------------- Generators ----------------

const HEART_SCALE: f32 = 0.2;
const HEART_THICKNESS: f32 = 5.0;

pub fn heart<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let t = rng.gen_range(0.0..TAU);
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
            let z = (rng.gen::<f32>() - 0.5) * HEART_THICKNESS;
            Vec3::new(x, y, z) * HEART_SCALE
        })
        .collect()
}

const FLOWER_PETALS: f32 = 5.0;
const FLOWER_RADII: Vec3 = Vec3::new(4.0, 4.0, 2.0);

pub fn flower<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let u = rng.gen_range(0.0..TAU);
            let v = rng.gen_range(0.0..PI);
            let r = (FLOWER_PETALS * u).cos();
            Vec3::new(r * v.sin() * u.cos(), r * v.sin() * u.sin(), r * v.cos()) * FLOWER_RADII
        })
        .collect()
}

pub const SATURN_PLANET_PERCENT: usize = 70;
pub const SATURN_PLANET_RADIUS: f32 = 2.5;
pub const SATURN_RING_INNER: f32 = 3.5;
pub const SATURN_RING_OUTER: f32 = 6.0;
pub const SATURN_RING_HALF_THICKNESS: f32 = 0.1;

pub fn saturn<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    let planet = count * SATURN_PLANET_PERCENT / 100;
    let mut points = Vec::with_capacity(count);
    for _ in 0..planet {
        points.push(unit_sphere_direction(rng) * SATURN_PLANET_RADIUS);
    }
    for _ in planet..count {
        let angle = rng.gen_range(0.0..TAU);
        let r = rng.gen_range(SATURN_RING_INNER..SATURN_RING_OUTER);
        let y = rng.gen_range(-SATURN_RING_HALF_THICKNESS..SATURN_RING_HALF_THICKNESS);
        points.push(Vec3::new(r * angle.cos(), y, r * angle.sin()));
    }
    points
}

/// One ellipsoidal shell of the seated figure.
struct BodyPart {
    share: f32, // cumulative probability upper bound
    radius: f32,
    scale: Vec3,
    offset: Vec3,
}

const FIGURE_PARTS: [BodyPart; 3] = [
    // head
    BodyPart {
        share: 0.2,
        radius: 1.2,
        scale: Vec3::ONE,
        offset: Vec3::new(0.0, 2.5, 0.0),
    },
    // torso
    BodyPart {
        share: 0.6,
        radius: 2.0,
        scale: Vec3::new(1.2, 1.5, 1.0),
        offset: Vec3::new(0.0, -0.5, 0.0),
    },
    // crossed legs
    BodyPart {
        share: 1.0,
        radius: 3.0,
        scale: Vec3::new(1.5, 0.5, 1.5),
        offset: Vec3::new(0.0, -2.5, 0.0),
    },
];

pub fn meditating_figure<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let pick: f32 = rng.gen();
            let part = FIGURE_PARTS
                .iter()
                .find(|p| pick < p.share)
                .unwrap_or(&FIGURE_PARTS[FIGURE_PARTS.len() - 1]);
            unit_sphere_direction(rng) * part.radius * part.scale + part.offset
        })
        .collect()
}

pub const STARBURST_MAX_RADIUS: f32 = 8.0;

pub fn starburst<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let dir = unit_sphere_direction(rng);
            dir * rng.gen_range(0.0..STARBURST_MAX_RADIUS)
        })
        .collect()
}
