use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::constants::DEFAULT_BASE_COLOR;
use crate::error::{MorphError, Result};

/// Linear RGB triple with every channel kept in \[0, 1\].
///
/// Fields are private so every value goes through [`Rgb::new`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    r: f32,
    g: f32,
    b: f32,
}

impl Rgb {
    /// Build a color, clamping each channel into \[0, 1\]. NaN maps to 0.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp01(r),
            g: clamp01(g),
            b: clamp01(b),
        }
    }

    pub fn r(self) -> f32 {
        self.r
    }

    pub fn g(self) -> f32 {
        self.g
    }

    pub fn b(self) -> f32 {
        self.b
    }

    pub fn from_array(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(MorphError::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| MorphError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// This color plus independent uniform noise in `[-amount, amount]` per
    /// channel, clamped back into range.
    pub fn jittered<R: Rng + ?Sized>(self, amount: f32, rng: &mut R) -> Self {
        if amount.is_nan() || amount <= 0.0 {
            return self;
        }
        Self::new(
            self.r + rng.gen_range(-amount..=amount),
            self.g + rng.gen_range(-amount..=amount),
            self.b + rng.gen_range(-amount..=amount),
        )
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::from_array(DEFAULT_BASE_COLOR)
    }
}

impl FromStr for Rgb {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_u8 = |c: f32| (c * 255.0).round() as u8;
        write!(f, "#{:02x}{:02x}{:02x}", to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }
}

#[inline]
fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
