use rapier2d::prelude::*;

use crate::foundation::core::{Rect, Vec2};
use crate::foundation::error::{RevealError, RevealResult};
use crate::physics::engine::{BodyHandle, BodyOptions, BodyPose, PhysicsEngine};

/// Canvas units per rapier meter.
pub const PIXELS_PER_METER: f64 = 100.0;

/// [`PhysicsEngine`] backed by a `rapier2d` world.
///
/// Bodies are fully dynamic but do not collide with each other; the blast impulse and gravity
/// alone shape the explosion.
pub struct RapierEngine {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    handles: Vec<RigidBodyHandle>,
}

impl Default for RapierEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RapierEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapierEngine")
            .field("bodies", &self.handles.len())
            .finish()
    }
}

impl RapierEngine {
    /// Empty world without gravity.
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, 0.0],
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            handles: Vec::new(),
        }
    }

    fn body_mut(&mut self, body: BodyHandle) -> Option<&mut RigidBody> {
        let handle = *self.handles.get(body.0 as usize)?;
        self.bodies.get_mut(handle)
    }
}

fn to_world(v: f64) -> Real {
    (v / PIXELS_PER_METER) as Real
}

fn to_canvas(v: Real) -> f64 {
    f64::from(v) * PIXELS_PER_METER
}

impl PhysicsEngine for RapierEngine {
    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = vector![to_world(gravity.x), to_world(gravity.y)];
    }

    fn create_body(
        &mut self,
        rect: Rect,
        angle: f64,
        options: &BodyOptions,
    ) -> RevealResult<BodyHandle> {
        if !rect.is_finite() || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Err(RevealError::validation(format!(
                "physics body needs a positive finite rect, got {rect:?}"
            )));
        }
        let center = rect.center();
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![to_world(center.x), to_world(center.y)])
            .rotation(angle as Real)
            .linear_damping(options.linear_damping as Real)
            .angular_damping(options.angular_damping as Real)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(
            to_world(rect.width() / 2.0),
            to_world(rect.height() / 2.0),
        )
        .density(options.density as Real)
        .restitution(options.restitution as Real)
        .friction(options.friction as Real)
        .collision_groups(InteractionGroups::none())
        .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        self.handles.push(handle);
        Ok(BodyHandle(self.handles.len() as u64 - 1))
    }

    fn apply_impulse(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(b) = self.body_mut(body) {
            let v = *b.linvel() + vector![to_world(velocity.x), to_world(velocity.y)];
            b.set_linvel(v, true);
        }
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, angular_velocity: f64) {
        if let Some(b) = self.body_mut(body) {
            let w = b.angvel() + angular_velocity as Real;
            b.set_angvel(w, true);
        }
    }

    fn step(&mut self, dt_ms: f64) {
        if dt_ms.is_nan() || dt_ms <= 0.0 || self.handles.is_empty() {
            return;
        }
        self.params.dt = (dt_ms / 1000.0) as Real;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    fn pose(&self, body: BodyHandle) -> Option<BodyPose> {
        let handle = *self.handles.get(body.0 as usize)?;
        let b = self.bodies.get(handle)?;
        let t = b.translation();
        Some(BodyPose {
            x: to_canvas(t.x),
            y: to_canvas(t.y),
            angle: f64::from(b.rotation().angle()),
        })
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn clear(&mut self) {
        let gravity = self.gravity;
        *self = Self::new();
        self.gravity = gravity;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/rapier.rs"]
mod tests;
