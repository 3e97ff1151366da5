//! Post-assembly sequence: pause, diagonal wave, physics explosion, outro, finished.
//!
//! Nothing here is stored between frames. Every value is derived from
//! `elapsed_after_finish = max(0, elapsed - total)`, so seeking to any time gives the same frame
//! as playing up to it.

/// Phase boundaries and per-frame finale values.
pub mod phase;

pub use phase::{FinalePhase, FinaleState};
