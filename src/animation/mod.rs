/// Easing curves.
pub mod ease;
/// Per-piece kinetic motion profiles.
pub mod motion;
/// Staggered per-piece progress across the assembly window.
pub mod timeline;
