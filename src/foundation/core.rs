use std::time::Duration;

use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::foundation::math::{mul_div255_u8, mul_div255_u16};

pub use kurbo::{Point, Rect, Vec2};

/// Index of an output video frame (0-based).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational output frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, must be > 0.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Build a frame rate, rejecting zero numerator or denominator.
    pub fn new(num: u32, den: u32) -> BarRaceResult<Self> {
        if den == 0 {
            return Err(BarRaceError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(BarRaceError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Number of whole frames needed to cover `d` (at least one).
    pub fn frames_for(self, d: Duration) -> u64 {
        let exact = d.as_secs_f64() * self.as_f64();
        ((exact - 1e-9).ceil().max(0.0) as u64).max(1)
    }
}

/// Output surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// Premultiply a straight-alpha colour.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            mul_div255_u8(u16::from(c), u16::from(a))
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Read one pixel from a 4-byte RGBA8 chunk.
    pub fn from_slice(px: &[u8]) -> Option<Self> {
        let [r, g, b, a] = <[u8; 4]>::try_from(px).ok()?;
        Some(Self { r, g, b, a })
    }

    /// Composite `self` over an opaque `bg`. The result is opaque.
    pub fn over_opaque(self, bg: Self) -> Self {
        let inv = 255 - u16::from(self.a);
        let blend =
            |s: u8, d: u8| (u16::from(s) + mul_div255_u16(u16::from(d), inv)).min(255) as u8;
        Self {
            r: blend(self.r, bg.r),
            g: blend(self.g, bg.g),
            b: blend(self.b, bg.b),
            a: 255,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
