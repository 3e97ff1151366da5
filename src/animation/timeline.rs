use crate::foundation::math::clamp01;

/// Default duration of one piece's individual flight.
pub const PIECE_ANIM_MS: f64 = 2700.0;

/// Stagger schedule: piece `k` of `n` (by assembly order) starts after
/// `k / n * (total - piece_anim)` and takes `piece_anim` to land.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssemblyTimeline {
    /// Length of the whole assembly in ms.
    pub total_ms: f64,
    /// Duration of one piece's animation in ms.
    pub piece_anim_ms: f64,
    /// Number of pieces sharing the window.
    pub piece_count: usize,
}

impl AssemblyTimeline {
    /// Schedule for `piece_count` pieces.
    pub fn new(total_ms: f64, piece_anim_ms: f64, piece_count: usize) -> Self {
        Self {
            total_ms,
            piece_anim_ms,
            piece_count,
        }
    }

    /// Start delay of the piece with `assembly_order`.
    pub fn delay(&self, assembly_order: u32) -> f64 {
        if self.piece_count == 0 {
            return 0.0;
        }
        let span = (self.total_ms - self.piece_anim_ms).max(0.0);
        f64::from(assembly_order) / self.piece_count as f64 * span
    }

    /// Own progress of the piece with `assembly_order` at `elapsed_ms`, in `[0, 1]`.
    pub fn progress(&self, assembly_order: u32, elapsed_ms: f64) -> f64 {
        let since = elapsed_ms - self.delay(assembly_order);
        if self.piece_anim_ms <= 0.0 {
            return if since >= 0.0 { 1.0 } else { 0.0 };
        }
        clamp01(since / self.piece_anim_ms)
    }

    /// Percentage of `orders` whose piece has landed at `elapsed_ms`.
    pub fn completion_percent(&self, orders: impl IntoIterator<Item = u32>, elapsed_ms: f64) -> f64 {
        let (mut total, mut done) = (0usize, 0usize);
        for order in orders {
            total += 1;
            if self.progress(order, elapsed_ms) >= 1.0 {
                done += 1;
            }
        }
        if total == 0 {
            return 0.0;
        }
        done as f64 / total as f64 * 100.0
    }

    /// Overall time progress in percent, capped at 100.
    pub fn time_percent(&self, elapsed_ms: f64) -> f64 {
        if self.total_ms <= 0.0 {
            return 100.0;
        }
        clamp01(elapsed_ms.min(self.total_ms) / self.total_ms) * 100.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
