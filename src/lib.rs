//! Procedural puzzle reveal videos.
//!
//! A source image is cut into interlocking pieces, flown into place along staggered kinetic
//! trajectories, held, rippled, blown apart by a rigid-body simulation and closed with a branded
//! outro card. Every frame is a pure function of elapsed time plus a little per-playback state.
//!
//! - Load a [`RevealConfig`] and create a [`RevealSession`]
//! - Load a [`SourceImage`] and build its [`PieceSet`]
//! - Render frames with [`RevealSession::render_at`] or stream the whole reveal into a
//!   [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Easing, motion profiles and the assembly schedule.
pub mod animation;
/// JSON configuration.
pub mod config;
/// Frame sinks, recording and output files.
pub mod encode;
/// Post-assembly phase machine.
pub mod finale;
/// Tessellation and piece outlines.
pub mod geometry;
/// Finale physics.
pub mod physics;
/// Piece records and the batch builder.
pub mod pieces;
/// Images, materials and piece bitmaps.
pub mod raster;
/// Frame compositing.
pub mod render;
/// External collaborators: content generation and audio.
pub mod services;
/// Playback sessions.
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Rgba8Premul, Size, Vec2,
    VIRTUAL_HEIGHT, VIRTUAL_WIDTH, virtual_center, virtual_rect,
};
pub use crate::foundation::error::{RevealError, RevealResult};

pub use crate::animation::motion::MotionProfile;
pub use crate::animation::timeline::AssemblyTimeline;
pub use crate::config::RevealConfig;
pub use crate::encode::export::{OutputNames, VideoMetadata};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoCodec};
pub use crate::encode::recorder::{Readiness, Recorder, Recording};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::finale::{FinalePhase, FinaleState};
pub use crate::geometry::shape::PieceShape;
pub use crate::physics::{PhysicsBridge, PhysicsEngine, RapierEngine};
pub use crate::pieces::builder::{BuildOpts, PieceBuilder};
pub use crate::pieces::piece::{Piece, PieceSet};
pub use crate::raster::image::{ImageToken, SourceImage};
pub use crate::raster::material::Material;
pub use crate::render::compositor::{FrameCompositor, FrameInputs, FrameRgba, FrameStats};
pub use crate::services::audio::{AudioCue, AudioCues, CueTrack, SilentAudio};
pub use crate::services::content::{ContentService, StoryArc};
pub use crate::session::clock::PlaybackClock;
pub use crate::session::playback::{BuildTicket, FrameReport, RevealSession};
