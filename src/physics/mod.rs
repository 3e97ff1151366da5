/// Explosion orchestration on top of an injected engine.
pub mod bridge;
/// Engine capability trait and shared body types.
pub mod engine;
/// `rapier2d` backed engine.
pub mod rapier;

pub use bridge::{EXPLOSION_PARTICIPATION_RATIO, PHYSICS_STEP_MS, PhysicsBridge};
pub use engine::{BodyHandle, BodyOptions, BodyPose, PhysicsEngine};
pub use rapier::RapierEngine;
