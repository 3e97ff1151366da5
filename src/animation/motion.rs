//! Kinetic motion profiles.
//!
//! A profile maps a piece's own normalized progress `t` to a center position, rotation and
//! scale. Every profile lands exactly on the target center with unit scale and zero rotation
//! at `t = 1`, so settled pieces can switch to the fixed draw path without a visible jump.

use std::f64::consts::{PI, TAU};

use crate::animation::ease::Ease;
use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::math::{clamp01, lerp, lerp_point};

/// Named kinetic style applied to every piece of a playback.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MotionProfile {
    /// Quintic glide with a gentle scale bump.
    #[default]
    Standard,
    /// Linear travel under a tall upward arc.
    Flight,
    /// Collapsing spiral.
    Vortex,
    /// Sinusoidal sway with a rotation wobble.
    Wave,
    /// Decaying bounce with squash and stretch.
    Playful,
    /// Quartic snap followed by a rubber-band settle.
    Elastic,
}

impl MotionProfile {
    /// Every profile, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Standard,
        Self::Flight,
        Self::Vortex,
        Self::Wave,
        Self::Playful,
        Self::Elastic,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Flight => "flight",
            Self::Vortex => "vortex",
            Self::Wave => "wave",
            Self::Playful => "playful",
            Self::Elastic => "elastic",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

const STANDARD_SCALE_BUMP: f64 = 0.15;

const FLIGHT_ARC_HEIGHT: f64 = 550.0;
const FLIGHT_SPIN: f64 = 0.6;
const FLIGHT_SCALE_BUMP: f64 = 0.45;

const VORTEX_TURNS: f64 = 6.0;
const VORTEX_RADIUS: f64 = 850.0;
const VORTEX_MIN_SCALE: f64 = 0.4;
const VORTEX_SPIN: f64 = 0.1;

const WAVE_CYCLES: f64 = 2.5;
const WAVE_WOBBLE_CYCLES: f64 = 1.5;
const WAVE_SWAY_X: f64 = 140.0;
const WAVE_SWAY_Y: f64 = 60.0;
const WAVE_WOBBLE: f64 = 0.35;
const WAVE_SCALE_BUMP: f64 = 0.15;

const PLAYFUL_BOUNCE_HEIGHT: f64 = 380.0;
const PLAYFUL_FREQUENCY: f64 = 4.0;
const PLAYFUL_SQUASH: f64 = 0.18;

const ELASTIC_SNAP_AT: f64 = 0.82;
const ELASTIC_OVERSHOOT: f64 = 0.15;
const ELASTIC_FREQUENCY: f64 = 5.0;
const ELASTIC_START_SCALE: f64 = 0.7;

/// Endpoints of one piece's flight, in virtual canvas units (piece centers).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionPath {
    /// Scattered starting center.
    pub start: Point,
    /// Final resting center.
    pub target: Point,
    /// Initial tilt in radians.
    pub rotation: f64,
}

/// Placement of a piece's center at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionTransform {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Horizontal-over-vertical stretch factor; 1 is undistorted.
    pub stretch: f64,
}

impl MotionTransform {
    /// Resting placement at `center`.
    pub fn settled(center: Point) -> Self {
        Self {
            x: center.x,
            y: center.y,
            rotation: 0.0,
            scale: 1.0,
            stretch: 1.0,
        }
    }

    /// Center as a point.
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Affine mapping piece-local coordinates (origin at the piece center) to the canvas.
    pub fn to_affine(&self) -> Affine {
        let sx = self.scale * self.stretch;
        let sy = if self.stretch.abs() > f64::EPSILON {
            self.scale / self.stretch
        } else {
            self.scale
        };
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(sx, sy)
    }
}

type MotionFn = fn(&MotionPath, f64) -> MotionTransform;

const MOTION_TABLE: [MotionFn; 6] = [standard, flight, vortex, wave, playful, elastic];

/// Evaluate `profile` for `path` at progress `t` (clamped to `[0, 1]`).
pub fn transform(path: &MotionPath, t: f64, profile: MotionProfile) -> MotionTransform {
    let t = clamp01(t);
    if t >= 1.0 {
        return MotionTransform::settled(path.target);
    }
    MOTION_TABLE[profile.index()](path, t)
}

fn place(p: Point, rotation: f64, scale: f64) -> MotionTransform {
    MotionTransform {
        x: p.x,
        y: p.y,
        rotation,
        scale,
        stretch: 1.0,
    }
}

fn standard(path: &MotionPath, t: f64) -> MotionTransform {
    let p = lerp_point(path.start, path.target, Ease::InOutQuint.apply(t));
    let scale = 1.0 + (t * PI).sin() * STANDARD_SCALE_BUMP;
    place(p, path.rotation * (1.0 - t), scale)
}

fn flight(path: &MotionPath, t: f64) -> MotionTransform {
    let mut p = lerp_point(path.start, path.target, t);
    p.y -= (t * PI).sin() * FLIGHT_ARC_HEIGHT;
    let rotation = (path.rotation + (t * PI).cos() * FLIGHT_SPIN) * (1.0 - t);
    let scale = 1.0 + (t * PI).sin() * FLIGHT_SCALE_BUMP;
    place(p, rotation, scale)
}

fn vortex(path: &MotionPath, t: f64) -> MotionTransform {
    let remaining = 1.0 - t;
    let angle = remaining * VORTEX_TURNS * TAU;
    let radius = VORTEX_RADIUS * remaining;
    let mut p = lerp_point(path.start, path.target, Ease::InOutCubic.apply(t));
    p.x += angle.cos() * radius;
    p.y += angle.sin() * radius;
    let rotation = path.rotation * remaining + angle * VORTEX_SPIN;
    place(p, rotation, lerp(VORTEX_MIN_SCALE, 1.0, t))
}

fn wave(path: &MotionPath, t: f64) -> MotionTransform {
    let decay = 1.0 - t;
    let phase = t * WAVE_CYCLES * TAU;
    let mut p = lerp_point(path.start, path.target, Ease::InOutCubic.apply(t));
    p.x += phase.sin() * WAVE_SWAY_X * decay;
    p.y += phase.cos() * WAVE_SWAY_Y * decay;
    let wobble = (t * WAVE_WOBBLE_CYCLES * TAU).sin() * WAVE_WOBBLE * decay;
    let scale = 1.0 + (t * PI).sin() * WAVE_SCALE_BUMP;
    place(p, path.rotation * decay + wobble, scale)
}

fn playful(path: &MotionPath, t: f64) -> MotionTransform {
    let decay = 1.0 - t;
    let beat = (t * PI * PLAYFUL_FREQUENCY).sin();
    let mut p = lerp_point(path.start, path.target, Ease::InOutCubic.apply(t));
    p.y -= beat.abs() * decay * PLAYFUL_BOUNCE_HEIGHT;
    MotionTransform {
        stretch: 1.0 + beat * PLAYFUL_SQUASH * decay,
        ..place(p, path.rotation * decay, 1.0)
    }
}

fn elastic(path: &MotionPath, t: f64) -> MotionTransform {
    let snap = if t < ELASTIC_SNAP_AT {
        Ease::InQuart.apply(t / ELASTIC_SNAP_AT)
    } else {
        1.0
    };
    let p = lerp_point(path.start, path.target, snap);
    let scale = if t < ELASTIC_SNAP_AT {
        lerp(ELASTIC_START_SCALE, 1.0, snap)
    } else {
        1.0 + ((t - ELASTIC_SNAP_AT) * PI * ELASTIC_FREQUENCY).sin() * ELASTIC_OVERSHOOT * (1.0 - t)
    };
    place(p, path.rotation * (1.0 - snap), scale)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion.rs"]
mod tests;
