//! Color types
//!
//! [`Color`] stores 8-bit channels, [`ColorF`] stores float channels in `0.0..=1.0`.

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, EngineResult};
use crate::foundation::math::{utils, Vec3, Vec4};

/// 32-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Opaque yellow
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    /// Default camera background
    pub const CORNFLOWER_BLUE: Self = Self::rgb(100, 149, 237);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs as `0xAARRGGBB`
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Unpacks `0xAARRGGBB`
    pub const fn from_argb(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Channel by index in `r, g, b, a` order
    pub fn channel(self, index: usize) -> EngineResult<u8> {
        match index {
            0 => Ok(self.r),
            1 => Ok(self.g),
            2 => Ok(self.b),
            3 => Ok(self.a),
            _ => Err(EngineError::InvalidArgument(format!(
                "color channel index {index} out of range 0..4"
            ))),
        }
    }

    /// Channel-wise interpolation
    pub fn lerp(self, other: Self, t: f32) -> Self {
        ColorF::from(self).lerp(ColorF::from(other), t).into()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Floating-point RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorF {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl ColorF {
    /// Create a color with alpha
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise interpolation
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: utils::lerp(self.r, other.r, t),
            g: utils::lerp(self.g, other.g, t),
            b: utils::lerp(self.b, other.b, t),
            a: utils::lerp(self.a, other.a, t),
        }
    }

    /// RGB as a vector
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    /// RGBA as a vector
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

impl Default for ColorF {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

fn channel_to_float(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl From<Color> for ColorF {
    fn from(color: Color) -> Self {
        Self {
            r: channel_to_float(color.r),
            g: channel_to_float(color.g),
            b: channel_to_float(color.b),
            a: channel_to_float(color.a),
        }
    }
}

impl From<ColorF> for Color {
    fn from(color: ColorF) -> Self {
        Self {
            r: channel_to_byte(color.r),
            g: channel_to_byte(color.g),
            b: channel_to_byte(color.b),
            a: channel_to_byte(color.a),
        }
    }
}

impl From<Vec4> for ColorF {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}
