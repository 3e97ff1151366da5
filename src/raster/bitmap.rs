use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Stroke, StrokeOpts};

use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::{RevealError, RevealResult};
use crate::raster::cpu;
use crate::raster::image::SourceImage;
use crate::raster::material::MaterialTexture;

/// Immutable pre-rendered piece: source pixels clipped to the outline with material and edge
/// baked in.
#[derive(Clone)]
pub struct PieceBitmap {
    pixmap: Arc<vello_cpu::Pixmap>,
    bounds: Rect,
    scale: f64,
}

impl std::fmt::Debug for PieceBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PieceBitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bounds", &self.bounds)
            .field("scale", &self.scale)
            .finish()
    }
}

impl PieceBitmap {
    /// Wrap premultiplied pixels covering `bounds` (cell-local units) at `scale` pixels per unit.
    pub fn from_premul(
        bytes: &[u8],
        width: u32,
        height: u32,
        bounds: Rect,
        scale: f64,
    ) -> RevealResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RevealError::raster("bitmap scale must be > 0"));
        }
        let pixmap = cpu::pixmap_from_premul_bytes(bytes, width, height)?;
        Ok(Self {
            pixmap: Arc::new(pixmap),
            bounds,
            scale,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Extent in cell-local virtual units, padding included.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Pixels per virtual unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Premultiplied RGBA8 pixels.
    pub fn premul_rgba8(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Bitmap pixel space to cell-local units.
    pub fn pixel_to_local(&self) -> Affine {
        Affine::translate(self.bounds.origin().to_vec2()) * Affine::scale(1.0 / self.scale)
    }

    /// Rectangle in pixel space covering the whole bitmap.
    pub(crate) fn pixel_rect(&self) -> vello_cpu::kurbo::Rect {
        vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(self.width()), f64::from(self.height()))
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        cpu::image_paint(self.pixmap.clone())
    }

    /// Draw with cell-local units mapped to output pixels by `local_to_output`.
    pub(crate) fn draw(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        local_to_output: Affine,
        opacity: f64,
    ) {
        if opacity.is_nan() || opacity <= 0.0 {
            return;
        }
        ctx.set_transform(cpu::affine_to_cpu(local_to_output * self.pixel_to_local()));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(self.paint());
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity as f32);
        }
        ctx.fill_rect(&self.pixel_rect());
        if opacity < 1.0 {
            ctx.pop_layer();
        }
    }
}

/// Everything needed to rasterize one piece.
pub struct RasterJob<'a> {
    /// Piece identity, for logging and fault injection.
    pub piece_id: u32,
    /// Outline in cell-local units.
    pub outline: &'a BezPath,
    /// Bitmap extent in cell-local units.
    pub bounds: Rect,
    /// Canvas position of the cell's top-left corner.
    pub cell_origin: Point,
    /// Output pixels per virtual unit.
    pub scale: f64,
    /// Image the piece samples.
    pub image: &'a SourceImage,
    /// Material overlay.
    pub texture: &'a MaterialTexture,
}

/// Turns piece outlines into bitmaps.
pub trait PieceRasterizer: Sync {
    /// Render one piece. Errors are reported per piece and never abort a batch.
    fn rasterize(
        &self,
        job: &RasterJob<'_>,
        scratch: &mut RasterScratch,
    ) -> RevealResult<PieceBitmap>;
}

/// Per-worker reusable render contexts keyed by pixel size.
#[derive(Default)]
pub struct RasterScratch {
    contexts: HashMap<(u16, u16), vello_cpu::RenderContext>,
}

impl RasterScratch {
    const MAX_CONTEXTS: usize = 8;

    fn context(&mut self, w: u16, h: u16) -> &mut vello_cpu::RenderContext {
        if self.contexts.len() >= Self::MAX_CONTEXTS && !self.contexts.contains_key(&(w, h)) {
            self.contexts.clear();
        }
        let ctx = self
            .contexts
            .entry((w, h))
            .or_insert_with(|| vello_cpu::RenderContext::new(w, h));
        ctx.reset();
        ctx
    }
}

/// `vello_cpu` piece rasterizer.
#[derive(Clone, Copy, Debug)]
pub struct CpuRasterizer {
    /// Width of the baked edge line in virtual units.
    pub edge_width: f64,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self { edge_width: 1.2 }
    }
}

impl PieceRasterizer for CpuRasterizer {
    fn rasterize(
        &self,
        job: &RasterJob<'_>,
        scratch: &mut RasterScratch,
    ) -> RevealResult<PieceBitmap> {
        if job.bounds.is_zero_area() || !job.bounds.is_finite() {
            return Err(RevealError::raster(format!(
                "piece {} has degenerate bounds {:?}",
                job.piece_id, job.bounds
            )));
        }
        let width = (job.bounds.width() * job.scale).ceil() as u32;
        let height = (job.bounds.height() * job.scale).ceil() as u32;
        let (w, h) = cpu::dims_u16(width, height)?;

        let local_to_px =
            Affine::scale(job.scale) * Affine::translate(-job.bounds.origin().to_vec2());
        let canvas_to_local = Affine::translate(-job.cell_origin.to_vec2());
        let clip = cpu::bezpath_to_cpu(job.outline);

        let ctx = scratch.context(w, h);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_transform(cpu::affine_to_cpu(local_to_px));

        ctx.set_paint_transform(cpu::affine_to_cpu(
            canvas_to_local * job.image.cover_fit().image_to_canvas(),
        ));
        ctx.set_paint(job.image.paint());
        ctx.fill_path(&clip);

        ctx.set_paint_transform(cpu::affine_to_cpu(
            canvas_to_local * Affine::scale(1.0 / job.texture.scale()),
        ));
        ctx.set_paint(job.texture.paint());
        ctx.fill_path(&clip);

        let edge = kurbo::stroke(
            job.outline.iter(),
            &Stroke::new(self.edge_width),
            &StrokeOpts::default(),
            0.05,
        );
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu::color_to_cpu(job.texture.material().edge_color()));
        ctx.fill_path(&cpu::bezpath_to_cpu(&edge));

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(PieceBitmap {
            pixmap: Arc::new(pixmap),
            bounds: job.bounds,
            scale: job.scale,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/bitmap.rs"]
mod tests;
