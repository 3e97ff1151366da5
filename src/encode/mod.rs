//! Recording surface.
//!
//! Sinks consume rendered frames in timeline order. The recorder runs a sink on its own
//! thread behind a readiness handshake, and the export helpers name and write the side files.

/// Output names, thumbnails and metadata text.
pub mod export;
/// `ffmpeg`-based sink with codec detection.
pub mod ffmpeg;
/// Threaded recorder with a readiness signal.
pub mod recorder;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
