/// Per-frame orchestration of every layer.
pub mod compositor;
/// Blurred backdrop, light sweep, dust and vignette.
pub mod environment;
/// Story-driven caption panel during assembly.
pub mod narrative;
/// Closing card with channel branding.
pub mod outro;
/// Font loading, measured wrapping and glyph drawing.
pub mod text;
/// Fading ghost trails behind moving pieces.
pub mod trail;
