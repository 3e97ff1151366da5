//! Assembles one output frame from elapsed time and piece state.
//!
//! Layer order: environment, finale zoom, ghost of the full image, pieces in z order (physics
//! pose, settled position with wave offset, or motion transform with trail), then either the
//! narrative caption or, once the explosion has started, the outro card.

use std::collections::HashMap;

use crate::animation::motion::{self, MotionProfile};
use crate::animation::timeline::AssemblyTimeline;
use crate::finale::phase::{FinalePhase, FinaleState};
use crate::foundation::core::{Affine, Canvas, Rgba8Premul, Vec2, virtual_center, virtual_rect};
use crate::foundation::error::RevealResult;
use crate::physics::engine::BodyPose;
use crate::pieces::piece::PieceSet;
use crate::raster::cpu;
use crate::raster::image::SourceImage;
use crate::render::environment::EnvironmentRenderer;
use crate::render::narrative::{self, NarrativeContent};
use crate::render::outro::OutroRenderer;
use crate::render::text::TextRenderer;
use crate::render::trail::TrailTracker;

/// Opacity of the full-image hint under the pieces.
pub const GHOST_OPACITY: f64 = 0.06;

/// Rendered frame, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Pixel at (`x`, `y`), if inside.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some(Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Straight-alpha copy flattened over opaque black, as encoders expect.
    pub fn to_opaque_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            px[3] = 255;
        }
        out
    }
}

/// What one frame needs besides the compositor's own state.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    /// Source image, for the ghost overlay and backdrop.
    pub image: Option<&'a SourceImage>,
    /// Pieces to draw; `None` renders only the environment and overlays.
    pub pieces: Option<&'a PieceSet>,
    /// Playback time.
    pub elapsed_ms: f64,
    /// Stagger schedule of the assembly.
    pub timeline: AssemblyTimeline,
    /// Kinetic style.
    pub profile: MotionProfile,
    /// Poses of exploded pieces.
    pub physics: Option<&'a HashMap<u32, BodyPose>>,
    /// Caption source.
    pub narrative: Option<&'a NarrativeContent>,
}

/// Per-frame counts, mainly for progress bars and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameStats {
    /// Share of pieces whose own progress reached 1, in percent.
    pub completion_percent: f64,
    /// Pieces drawn from a physics pose.
    pub physics_drawn: usize,
    /// Pieces drawn at their resting position.
    pub settled_drawn: usize,
    /// Pieces drawn mid-flight.
    pub moving_drawn: usize,
    /// Pieces without a bitmap.
    pub skipped: usize,
}

/// Owns every per-playback render cache and draws frames.
pub struct FrameCompositor {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    environment: EnvironmentRenderer,
    trails: TrailTracker,
    text: TextRenderer,
    outro: OutroRenderer,
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("canvas", &self.canvas)
            .field("trails", &self.trails)
            .field("text", &self.text)
            .finish()
    }
}

impl FrameCompositor {
    /// Compositor drawing into `canvas`.
    pub fn new(
        canvas: Canvas,
        text: TextRenderer,
        outro: OutroRenderer,
        seed: u64,
    ) -> RevealResult<Self> {
        let (w, h) = cpu::dims_u16(canvas.width, canvas.height)?;
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            environment: EnvironmentRenderer::new(seed),
            trails: TrailTracker::new(),
            text,
            outro,
        })
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Trail state.
    pub fn trails(&self) -> &TrailTracker {
        &self.trails
    }

    /// Text renderer and its layout cache.
    pub fn text(&self) -> &TextRenderer {
        &self.text
    }

    /// Drop trails, cached layouts and the blurred backdrop, e.g. after a new image loads.
    pub fn reset(&mut self) {
        self.trails.reset();
        self.text.clear_cache();
        self.environment.reset();
    }

    /// Draw one frame. Never fails; trouble is logged and the layer skipped.
    pub fn render_frame(&mut self, inputs: &FrameInputs<'_>) -> FrameStats {
        let base = Affine::scale(self.canvas.scale());
        let elapsed = if inputs.elapsed_ms.is_finite() {
            inputs.elapsed_ms.max(0.0)
        } else {
            0.0
        };
        let finale = FinaleState::at(elapsed, inputs.timeline.total_ms);
        let mut stats = FrameStats::default();

        self.ctx.reset();
        self.environment
            .render(&mut self.ctx, base, inputs.image, elapsed);

        let zoom = finale.zoom();
        let center = virtual_center().to_vec2();
        let camera = base
            * Affine::translate(center)
            * Affine::scale(zoom)
            * Affine::translate(-center);

        if let Some(image) = inputs.image {
            self.ctx.set_transform(cpu::affine_to_cpu(camera));
            self.ctx
                .set_paint_transform(cpu::affine_to_cpu(image.cover_fit().image_to_canvas()));
            self.ctx.set_paint(image.paint());
            self.ctx.push_opacity_layer(GHOST_OPACITY as f32);
            self.ctx.fill_rect(&cpu::rect_to_cpu(virtual_rect()));
            self.ctx.pop_layer();
            self.ctx
                .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        }

        if let Some(set) = inputs.pieces {
            stats.completion_percent = inputs.timeline.completion_percent(
                set.pieces().iter().map(|p| p.assembly_order),
                elapsed,
            );
            self.draw_pieces(set, inputs, camera, &finale, elapsed, &mut stats);
        }

        if !finale.phase.is_explosion() {
            if let Some(content) = inputs.narrative
                && let Some(caption) =
                    content.caption_at(inputs.timeline.time_percent(elapsed))
            {
                narrative::render_caption(&mut self.ctx, base, &mut self.text, &caption);
            }
        } else if let Some(t) = finale.outro_elapsed() {
            self.outro
                .render(&mut self.ctx, base, &mut self.text, t, finale.outro_alpha());
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        seal_alpha(self.pixmap.data_as_u8_slice_mut());
        stats
    }

    fn draw_pieces(
        &mut self,
        set: &PieceSet,
        inputs: &FrameInputs<'_>,
        camera: Affine,
        finale: &FinaleState,
        elapsed: f64,
        stats: &mut FrameStats,
    ) {
        for piece in set.pieces() {
            let Some(bitmap) = piece.bitmap.as_ref() else {
                stats.skipped += 1;
                continue;
            };
            let half = Vec2::new(piece.size.width / 2.0, piece.size.height / 2.0);

            if let Some(pose) = inputs.physics.and_then(|m| m.get(&piece.id)) {
                self.trails.clear(piece.id);
                let placed = Affine::translate(Vec2::new(pose.x, pose.y))
                    * Affine::rotate(pose.angle)
                    * Affine::translate(-half);
                bitmap.draw(&mut self.ctx, camera * placed, 1.0);
                stats.physics_drawn += 1;
                continue;
            }

            let progress = inputs.timeline.progress(piece.assembly_order, elapsed);
            if progress >= 1.0 {
                self.trails.clear(piece.id);
                let wave = if finale.phase == FinalePhase::Wave {
                    finale.diagonal_wave_y(piece)
                } else {
                    0.0
                };
                let placed = Affine::translate(piece.target.to_vec2() + Vec2::new(0.0, wave));
                bitmap.draw(&mut self.ctx, camera * placed, 1.0);
                stats.settled_drawn += 1;
                continue;
            }

            let mt = motion::transform(&piece.motion_path(), progress, inputs.profile);
            self.trails
                .update(piece.id, &mt, elapsed, inputs.profile, progress);
            self.trails
                .render(&mut self.ctx, camera, piece, inputs.profile, progress);
            bitmap.draw(
                &mut self.ctx,
                camera * mt.to_affine() * Affine::translate(-half),
                1.0,
            );
            stats.moving_drawn += 1;
        }
    }

    /// Copy of the last rendered frame.
    pub fn frame(&self) -> FrameRgba {
        FrameRgba {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
        }
    }

    /// Premultiplied pixels of the last rendered frame.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }
}

/// The backdrop covers every pixel, so alpha below 255 is u8 rounding from translucent layers.
fn seal_alpha(premul: &mut [u8]) {
    for px in premul.chunks_exact_mut(4) {
        px[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
