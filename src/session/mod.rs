//! Playback orchestration.
//!
//! A [`playback::RevealSession`] owns everything one reveal needs between frames: the image, the
//! installed piece set, the compositor caches, the physics world and the audio capability.

/// Monotonic playback clock.
pub mod clock;
/// Reveal session: build installation, per-frame rendering and video recording.
pub mod playback;
