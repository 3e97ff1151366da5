//! Boundaries to collaborators outside the render core.
//!
//! Content generation (images, story arcs, music) and audio playback are consumed through
//! traits so sessions and tests can swap in offline or silent implementations.

/// Injected audio-cue capability and an offline cue mixer.
pub mod audio;
/// Content-generation service boundary with retry and fallback helpers.
pub mod content;
