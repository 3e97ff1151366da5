//! Ghost trails behind pieces in flight.
//!
//! History lives here, keyed by piece id, never on the piece. Each profile has its own look
//! (tint, blur, length, sample spacing) taken from [`TRAIL_STYLES`]. Ghost images are derived
//! once per piece from its baked bitmap and dropped when the piece lands.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::animation::motion::{MotionProfile, MotionTransform};
use crate::foundation::core::{Affine, Rgba8, Vec2};
use crate::foundation::error::RevealResult;
use crate::pieces::piece::Piece;
use crate::raster::bitmap::PieceBitmap;
use crate::raster::blur::{blur_rgba8_premul, sigma_for_radius};

/// Own-progress window in which trails are recorded and drawn.
pub const TRAIL_ACTIVE_WINDOW: (f64, f64) = (0.10, 0.85);

/// Visual signature of one profile's trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailStyle {
    /// Color mixed into the ghost image.
    pub tint: Rgba8,
    /// Share of the tint in the mix.
    pub tint_mix: f64,
    /// Blur radius in bitmap pixels.
    pub blur_radius: u32,
    /// Samples kept.
    pub max_len: usize,
    /// Minimum time between samples.
    pub spacing_ms: f64,
    /// Opacity of the newest sample.
    pub peak_alpha: f64,
}

/// Per-profile trail styles, indexed in [`MotionProfile::ALL`] order.
pub const TRAIL_STYLES: [TrailStyle; 6] = [
    TrailStyle {
        tint: Rgba8::rgb(255, 255, 255),
        tint_mix: 0.25,
        blur_radius: 2,
        max_len: 2,
        spacing_ms: 90.0,
        peak_alpha: 0.28,
    },
    TrailStyle {
        tint: Rgba8::rgb(120, 200, 255),
        tint_mix: 0.45,
        blur_radius: 3,
        max_len: 3,
        spacing_ms: 75.0,
        peak_alpha: 0.35,
    },
    TrailStyle {
        tint: Rgba8::rgb(190, 120, 255),
        tint_mix: 0.5,
        blur_radius: 4,
        max_len: 3,
        spacing_ms: 80.0,
        peak_alpha: 0.32,
    },
    TrailStyle {
        tint: Rgba8::rgb(90, 230, 210),
        tint_mix: 0.4,
        blur_radius: 3,
        max_len: 3,
        spacing_ms: 85.0,
        peak_alpha: 0.3,
    },
    TrailStyle {
        tint: Rgba8::rgb(255, 190, 90),
        tint_mix: 0.45,
        blur_radius: 2,
        max_len: 2,
        spacing_ms: 100.0,
        peak_alpha: 0.3,
    },
    TrailStyle {
        tint: Rgba8::rgb(255, 120, 170),
        tint_mix: 0.4,
        blur_radius: 2,
        max_len: 2,
        spacing_ms: 95.0,
        peak_alpha: 0.26,
    },
];

impl TrailStyle {
    /// Style of `profile`.
    pub fn for_profile(profile: MotionProfile) -> Self {
        TRAIL_STYLES[profile.index()]
    }
}

/// One remembered placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSample {
    /// Where the piece was.
    pub transform: MotionTransform,
    /// When, in playback ms.
    pub t_ms: f64,
}

type History = SmallVec<[TrailSample; 3]>;

/// Whether `progress` lies in [`TRAIL_ACTIVE_WINDOW`].
pub fn trail_active(progress: f64) -> bool {
    (TRAIL_ACTIVE_WINDOW.0..=TRAIL_ACTIVE_WINDOW.1).contains(&progress)
}

/// Trail histories and ghost images for every moving piece.
#[derive(Default)]
pub struct TrailTracker {
    history: HashMap<u32, History>,
    ghosts: HashMap<u32, (MotionProfile, PieceBitmap)>,
}

impl std::fmt::Debug for TrailTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrailTracker")
            .field("pieces", &self.history.len())
            .field("ghosts", &self.ghosts.len())
            .finish()
    }
}

impl TrailTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `transform` for `piece_id` if its progress is inside the active window and
    /// enough time has passed since the last sample. Returns whether a sample was added.
    pub fn update(
        &mut self,
        piece_id: u32,
        transform: &MotionTransform,
        now_ms: f64,
        profile: MotionProfile,
        progress: f64,
    ) -> bool {
        if !trail_active(progress) {
            return false;
        }
        let style = TrailStyle::for_profile(profile);
        let history = self.history.entry(piece_id).or_default();
        if let Some(last) = history.last() {
            if now_ms < last.t_ms {
                history.clear();
            } else if now_ms - last.t_ms < style.spacing_ms {
                return false;
            }
        }
        history.push(TrailSample {
            transform: *transform,
            t_ms: now_ms,
        });
        while history.len() > style.max_len {
            history.remove(0);
        }
        true
    }

    /// Samples recorded for `piece_id`, oldest first.
    pub fn samples(&self, piece_id: u32) -> &[TrailSample] {
        self.history.get(&piece_id).map_or(&[], |h| h.as_slice())
    }

    /// Number of pieces with a history.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no piece has a history.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget `piece_id`'s history and ghost.
    pub fn clear(&mut self, piece_id: u32) {
        self.history.remove(&piece_id);
        self.ghosts.remove(&piece_id);
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.history.clear();
        self.ghosts.clear();
    }

    /// Draw `piece`'s samples oldest to newest with rising opacity under `camera`.
    pub(crate) fn render(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        camera: Affine,
        piece: &Piece,
        profile: MotionProfile,
        progress: f64,
    ) {
        if !trail_active(progress) {
            return;
        }
        let Some(history) = self.history.get(&piece.id) else {
            return;
        };
        if history.is_empty() {
            return;
        }
        let Some(bitmap) = piece.bitmap.as_ref() else {
            return;
        };
        let style = TrailStyle::for_profile(profile);

        let fresh = match self.ghosts.get(&piece.id) {
            Some((p, _)) => *p != profile,
            None => true,
        };
        if fresh {
            match ghost_bitmap(bitmap, &style) {
                Ok(g) => {
                    self.ghosts.insert(piece.id, (profile, g));
                }
                Err(err) => {
                    tracing::warn!(piece = piece.id, error = %err, "trail ghost failed");
                    return;
                }
            }
        }
        let Some((_, ghost)) = self.ghosts.get(&piece.id) else {
            return;
        };

        let n = history.len() as f64;
        let half = Vec2::new(piece.size.width / 2.0, piece.size.height / 2.0);
        let center = Affine::translate(-half);
        for (i, sample) in history.iter().enumerate() {
            let alpha = style.peak_alpha * (i as f64 + 1.0) / (n + 1.0);
            ghost.draw(ctx, camera * sample.transform.to_affine() * center, alpha);
        }
    }
}

/// Tinted, blurred copy of `bitmap`.
fn ghost_bitmap(bitmap: &PieceBitmap, style: &TrailStyle) -> RevealResult<PieceBitmap> {
    let mix = style.tint_mix.clamp(0.0, 1.0);
    let mut tinted = bitmap.premul_rgba8().to_vec();
    let tint = [style.tint.r, style.tint.g, style.tint.b];
    for px in tinted.chunks_exact_mut(4) {
        let alpha = f64::from(px[3]);
        for (c, t) in px[..3].iter_mut().zip(tint) {
            let v = f64::from(*c) * (1.0 - mix) + f64::from(t) * (alpha / 255.0) * mix;
            *c = v.round().clamp(0.0, alpha) as u8;
        }
    }
    let blurred = blur_rgba8_premul(
        &tinted,
        bitmap.width(),
        bitmap.height(),
        style.blur_radius,
        sigma_for_radius(style.blur_radius),
    )?;
    PieceBitmap::from_premul(
        &blurred,
        bitmap.width(),
        bitmap.height(),
        bitmap.bounds(),
        bitmap.scale(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/trail.rs"]
mod tests;
