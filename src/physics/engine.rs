use crate::foundation::core::{Rect, Vec2};
use crate::foundation::error::RevealResult;

/// Opaque body identity issued by an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

/// Center position (virtual canvas units) and rotation (radians) of a body.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BodyPose {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Rotation in radians.
    pub angle: f64,
}

/// Material parameters for a dynamic body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyOptions {
    /// Mass per area.
    pub density: f64,
    /// Bounciness.
    pub restitution: f64,
    /// Surface friction.
    pub friction: f64,
    /// Linear velocity decay per second.
    pub linear_damping: f64,
    /// Angular velocity decay per second.
    pub angular_damping: f64,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            density: 1.0,
            restitution: 0.3,
            friction: 0.4,
            linear_damping: 0.05,
            angular_damping: 0.2,
        }
    }
}

/// 2D rigid-body capability the explosion runs on.
///
/// All quantities are in virtual canvas units with y pointing down.
pub trait PhysicsEngine {
    /// Constant acceleration applied to every dynamic body, units per second squared.
    fn set_gravity(&mut self, gravity: Vec2);

    /// Add a dynamic rectangular body covering `rect`, rotated by `angle` about its center.
    fn create_body(
        &mut self,
        rect: Rect,
        angle: f64,
        options: &BodyOptions,
    ) -> RevealResult<BodyHandle>;

    /// Instantaneous change of linear velocity, units per second.
    fn apply_impulse(&mut self, body: BodyHandle, velocity: Vec2);

    /// Instantaneous change of angular velocity, radians per second.
    fn apply_torque_impulse(&mut self, body: BodyHandle, angular_velocity: f64);

    /// Advance the simulation by `dt_ms`.
    fn step(&mut self, dt_ms: f64);

    /// Current pose of `body`, if it exists.
    fn pose(&self, body: BodyHandle) -> Option<BodyPose>;

    /// Number of bodies in the world.
    fn body_count(&self) -> usize;

    /// Remove every body.
    fn clear(&mut self);
}
