use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::foundation::core::{Vec2, virtual_center};
use crate::physics::engine::{BodyHandle, BodyOptions, BodyPose, PhysicsEngine};
use crate::physics::rapier::RapierEngine;
use crate::pieces::piece::Piece;

/// Share of completed pieces that take part in the explosion.
pub const EXPLOSION_PARTICIPATION_RATIO: f64 = 0.7;

/// Fixed simulation step, one 60 Hz frame.
pub const PHYSICS_STEP_MS: f64 = 1000.0 / 60.0;

/// Downward acceleration during the explosion, canvas units per second squared.
pub const EXPLOSION_GRAVITY: f64 = 1800.0;

/// Outward speed per unit of distance from the canvas center, randomized within this range.
const BLAST_SPEED_PER_UNIT: (f64, f64) = (0.9, 1.8);
/// Minimum outward speed so central pieces still move.
const BLAST_MIN_SPEED: f64 = 150.0;
/// Extra downward speed added to every blast.
const BLAST_DOWNWARD_BIAS: f64 = 220.0;
/// Largest initial spin either way, radians per second.
const BLAST_MAX_SPIN: f64 = 5.0;

/// Owns the physics world for the finale and converts pieces into bodies once.
pub struct PhysicsBridge {
    engine: Option<Box<dyn PhysicsEngine>>,
    bodies: Vec<(u32, BodyHandle)>,
    activated: bool,
    seed: u64,
    body_options: BodyOptions,
    pending_ms: f64,
}

impl std::fmt::Debug for PhysicsBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsBridge")
            .field("available", &self.engine.is_some())
            .field("activated", &self.activated)
            .field("bodies", &self.bodies.len())
            .finish()
    }
}

impl PhysicsBridge {
    /// Bridge over `engine`; `None` makes every operation a no-op.
    pub fn new(engine: Option<Box<dyn PhysicsEngine>>, seed: u64) -> Self {
        if engine.is_none() {
            tracing::warn!("no physics engine available, the explosion will be skipped");
        }
        Self {
            engine,
            bodies: Vec::new(),
            activated: false,
            seed,
            body_options: BodyOptions::default(),
            pending_ms: 0.0,
        }
    }

    /// Bridge over a fresh [`RapierEngine`].
    pub fn with_rapier(seed: u64) -> Self {
        Self::new(Some(Box::new(RapierEngine::new())), seed)
    }

    /// Whether an engine is attached.
    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Whether [`activate`](Self::activate) has run since the last reset.
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Bodies currently in the engine's world.
    pub fn body_count(&self) -> usize {
        self.engine.as_ref().map_or(0, |e| e.body_count())
    }

    /// Blow a random share of `completed` pieces outward from the canvas center.
    ///
    /// Runs once per playback; later calls return `0` without touching the world. Returns the
    /// number of bodies created.
    #[tracing::instrument(skip_all, fields(seed = self.seed))]
    pub fn activate<'a>(&mut self, completed: impl IntoIterator<Item = &'a Piece>) -> usize {
        if self.activated {
            tracing::debug!("explosion already triggered");
            return 0;
        }
        self.activated = true;
        let Some(engine) = self.engine.as_mut() else {
            return 0;
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut chosen: Vec<&Piece> = completed.into_iter().collect();
        chosen.shuffle(&mut rng);
        let take = (chosen.len() as f64 * EXPLOSION_PARTICIPATION_RATIO).floor() as usize;
        chosen.truncate(take);

        engine.set_gravity(Vec2::new(0.0, EXPLOSION_GRAVITY));
        let center = virtual_center();
        for piece in chosen {
            let handle = match engine.create_body(piece.target_rect(), 0.0, &self.body_options) {
                Ok(h) => h,
                Err(err) => {
                    tracing::warn!(piece = piece.id, error = %err, "physics body creation failed");
                    continue;
                }
            };
            let offset = piece.target_center() - center;
            let distance = offset.hypot();
            let dir = if distance > 1e-6 {
                offset / distance
            } else {
                Vec2::new(0.0, -1.0)
            };
            let speed = (distance
                * rng.random_range(BLAST_SPEED_PER_UNIT.0..BLAST_SPEED_PER_UNIT.1))
            .max(BLAST_MIN_SPEED);
            engine.apply_impulse(handle, dir * speed + Vec2::new(0.0, BLAST_DOWNWARD_BIAS));
            engine.apply_torque_impulse(handle, rng.random_range(-BLAST_MAX_SPIN..BLAST_MAX_SPIN));
            self.bodies.push((piece.id, handle));
        }
        tracing::debug!(bodies = self.bodies.len(), "explosion activated");
        self.bodies.len()
    }

    /// Advance the world by `dt_ms` once activated.
    pub fn step(&mut self, dt_ms: f64) {
        if !self.activated || self.bodies.is_empty() {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.step(dt_ms);
        }
    }

    /// Advance simulated time by `dt_ms` in whole [`PHYSICS_STEP_MS`] steps.
    ///
    /// The remainder carries into the next call, so the simulation stays independent of the
    /// frame rate. Returns the number of steps taken.
    pub fn advance(&mut self, dt_ms: f64) -> usize {
        if !self.activated || self.bodies.is_empty() || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return 0;
        }
        self.pending_ms += dt_ms;
        let mut steps = 0;
        while self.pending_ms >= PHYSICS_STEP_MS {
            self.pending_ms -= PHYSICS_STEP_MS;
            self.step(PHYSICS_STEP_MS);
            steps += 1;
        }
        steps
    }

    /// Current pose of every exploded piece, keyed by piece id.
    pub fn read_positions(&self) -> HashMap<u32, BodyPose> {
        let Some(engine) = self.engine.as_ref() else {
            return HashMap::new();
        };
        self.bodies
            .iter()
            .filter_map(|&(id, handle)| engine.pose(handle).map(|pose| (id, pose)))
            .collect()
    }

    /// Drop every body and re-arm the activation latch.
    pub fn reset(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.clear();
        }
        self.bodies.clear();
        self.activated = false;
        self.pending_ms = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/bridge.rs"]
mod tests;
