use crate::foundation::error::{RevealError, RevealResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Width of the logical canvas every piece is laid out in.
pub const VIRTUAL_WIDTH: f64 = 1080.0;
/// Height of the logical canvas every piece is laid out in.
pub const VIRTUAL_HEIGHT: f64 = 2280.0;

/// Zero-based index of an output video frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, always > 0.
    pub den: u32,
}

impl Fps {
    /// Build a frame rate, rejecting zero numerator or denominator.
    pub fn new(num: u32, den: u32) -> RevealResult<Self> {
        if den == 0 {
            return Err(RevealError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RevealError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Timeline position of `frame` in milliseconds.
    pub fn frame_to_ms(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * self.frame_duration_ms()
    }

    /// Number of whole frames needed to cover `ms`.
    pub fn frames_for_ms(self, ms: f64) -> u64 {
        if !ms.is_finite() || ms <= 0.0 {
            return 0;
        }
        (ms / self.frame_duration_ms()).ceil() as u64
    }
}

/// Output raster dimensions in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas matching the virtual layout space scaled by `scale`.
    pub fn for_scale(scale: f64) -> RevealResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RevealError::validation("render scale must be > 0"));
        }
        let width = (VIRTUAL_WIDTH * scale).round() as u32;
        let height = (VIRTUAL_HEIGHT * scale).round() as u32;
        Self::new(width, height)
    }

    /// Build a canvas, rejecting sizes the rasterizer cannot address.
    pub fn new(width: u32, height: u32) -> RevealResult<Self> {
        if width == 0 || height == 0 {
            return Err(RevealError::validation("canvas must be non-empty"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(RevealError::validation(format!(
                "canvas {width}x{height} exceeds {} pixels per side",
                u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    /// Device-pixels per virtual unit.
    pub fn scale(self) -> f64 {
        f64::from(self.width) / VIRTUAL_WIDTH
    }
}

/// The virtual canvas as a rectangle.
pub fn virtual_rect() -> Rect {
    Rect::new(0.0, 0.0, VIRTUAL_WIDTH, VIRTUAL_HEIGHT)
}

/// Center of the virtual canvas.
pub fn virtual_center() -> Point {
    Point::new(VIRTUAL_WIDTH / 2.0, VIRTUAL_HEIGHT / 2.0)
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scale alpha by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let op = opacity.clamp(0.0, 1.0);
        Self {
            a: (f64::from(self.a) * op).round() as u8,
            ..self
        }
    }

    /// Premultiplied form.
    pub fn premultiplied(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
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
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply straight components.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Component array in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
