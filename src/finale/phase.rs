use std::f64::consts::PI;

use crate::foundation::math::clamp01;
use crate::pieces::piece::Piece;

/// Still pause after the last piece lands.
pub const PAUSE_MS: f64 = 16_000.0;
/// Duration of the diagonal ripple.
pub const WAVE_MS: f64 = 3_000.0;
/// Gap between the end of the ripple and the explosion.
pub const EXPLODE_DELAY_MS: f64 = 500.0;
/// Explosion trigger, relative to the end of assembly.
pub const EXPLODE_AT_MS: f64 = PAUSE_MS + WAVE_MS + EXPLODE_DELAY_MS;
/// Outro card start, relative to the end of assembly.
pub const OUTRO_START_MS: f64 = 21_000.0;
/// Outro card fade-in.
pub const OUTRO_FADE_MS: f64 = 900.0;
/// End of the whole sequence, relative to the end of assembly.
pub const FINISH_MS: f64 = 29_500.0;

/// Per-piece ripple duration inside the wave window.
pub const WAVE_PIECE_MS: f64 = 1_200.0;
/// Peak upward bob of a rippling piece.
pub const WAVE_AMPLITUDE: f64 = 65.0;

/// Elapsed-after-finish per unit of extra zoom.
pub const ZOOM_RATE_MS: f64 = 80_000.0;
/// Upper bound of the creeping finale zoom.
pub const MAX_FINALE_ZOOM: f64 = 1.5;

/// Phase of the reveal at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalePhase {
    /// Pieces are still flying in.
    Assembling,
    /// Completed mosaic holds still.
    Pause,
    /// Diagonal ripple across the mosaic.
    Wave,
    /// Physics bodies are flying.
    Exploding,
    /// Outro card is visible.
    Outro,
    /// Terminal.
    Finished,
}

impl FinalePhase {
    /// Phase for a given time past the end of assembly.
    fn after_finish(eaf: f64) -> Self {
        if eaf <= PAUSE_MS {
            Self::Pause
        } else if eaf < EXPLODE_AT_MS {
            Self::Wave
        } else if eaf < OUTRO_START_MS {
            Self::Exploding
        } else if eaf < FINISH_MS {
            Self::Outro
        } else {
            Self::Finished
        }
    }

    /// Whether physics drives (some) pieces and the outro replaces the narrative.
    pub fn is_explosion(self) -> bool {
        matches!(self, Self::Exploding | Self::Outro | Self::Finished)
    }
}

/// Finale values derived from one `(elapsed, total)` pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinaleState {
    /// Current phase.
    pub phase: FinalePhase,
    /// `max(0, elapsed - total)`.
    pub elapsed_after_finish: f64,
}

impl FinaleState {
    /// State at `elapsed_ms` into a reveal whose assembly lasts `total_ms`.
    pub fn at(elapsed_ms: f64, total_ms: f64) -> Self {
        let elapsed = if elapsed_ms.is_finite() { elapsed_ms } else { 0.0 };
        if elapsed < total_ms {
            return Self {
                phase: FinalePhase::Assembling,
                elapsed_after_finish: 0.0,
            };
        }
        let eaf = (elapsed - total_ms).max(0.0);
        Self {
            phase: FinalePhase::after_finish(eaf),
            elapsed_after_finish: eaf,
        }
    }

    /// Whether assembly is over.
    pub fn in_finale(&self) -> bool {
        self.phase != FinalePhase::Assembling
    }

    /// Camera zoom about the canvas center, `1 + eaf / 80000` capped at [`MAX_FINALE_ZOOM`].
    pub fn zoom(&self) -> f64 {
        if !self.in_finale() {
            return 1.0;
        }
        (1.0 + self.elapsed_after_finish / ZOOM_RATE_MS).min(MAX_FINALE_ZOOM)
    }

    /// Whether the explosion trigger time has been reached.
    pub fn explosion_due(&self) -> bool {
        self.in_finale() && self.elapsed_after_finish >= EXPLODE_AT_MS
    }

    /// Outro card opacity in `[0, 1]`.
    pub fn outro_alpha(&self) -> f64 {
        if !self.in_finale() {
            return 0.0;
        }
        clamp01((self.elapsed_after_finish - OUTRO_START_MS) / OUTRO_FADE_MS)
    }

    /// Time since the outro card started, if it has.
    pub fn outro_elapsed(&self) -> Option<f64> {
        (self.in_finale() && self.elapsed_after_finish >= OUTRO_START_MS)
            .then(|| self.elapsed_after_finish - OUTRO_START_MS)
    }

    /// Vertical ripple offset of `piece`; zero outside the wave window.
    ///
    /// Each piece starts its bob after its cached diagonal delay, so the crest travels from
    /// the top-left corner to the bottom-right.
    pub fn diagonal_wave_y(&self, piece: &Piece) -> f64 {
        if self.phase != FinalePhase::Wave {
            return 0.0;
        }
        let wave_elapsed = self.elapsed_after_finish - PAUSE_MS;
        let delay = piece.wave_delay() * (WAVE_MS - WAVE_PIECE_MS);
        let local = clamp01((wave_elapsed - delay) / WAVE_PIECE_MS);
        -(local * PI).sin() * WAVE_AMPLITUDE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/finale/phase.rs"]
mod tests;
