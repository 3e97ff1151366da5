//! Turns a source image into a [`PieceSet`].
//!
//! Layout and randomization run sequentially from one seeded RNG so a seed always yields the
//! same set. Rasterization is the expensive part: it runs in chunks of [`BUILD_CHUNK`] pieces on
//! the rayon pool, with progress reported after every chunk. A piece whose bitmap fails is kept
//! (its assembly slot still exists) but is never drawn.

use std::f64::consts::FRAC_PI_3;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::foundation::core::{
    BezPath, Canvas, Point, Size, VIRTUAL_HEIGHT, VIRTUAL_WIDTH, Vec2,
};
use crate::foundation::error::{RevealError, RevealResult};
use crate::foundation::math::lerp;
use crate::geometry::jigsaw::ConnectionGrid;
use crate::geometry::layout::{sector_index, tessellate};
use crate::geometry::shape::{self, PieceShape};
use crate::pieces::piece::{Piece, PieceSet, diagonal_delay};
use crate::raster::bitmap::{CpuRasterizer, PieceRasterizer, RasterJob, RasterScratch};
use crate::raster::image::SourceImage;
use crate::raster::material::{Material, MaterialTexture};

/// Pieces rasterized between progress reports.
pub const BUILD_CHUNK: usize = 100;

/// Largest accepted piece count.
pub const MAX_PIECES: u32 = 5000;

/// Maximum initial tilt either way.
const MAX_TILT: f64 = FRAC_PI_3;

/// Vertical band (fractions of canvas height) start centers are drawn from.
const START_BAND: (f64, f64) = (0.72, 1.12);

/// Horizontal overshoot of start centers past each canvas side.
const START_SPREAD_X: f64 = 0.1;

/// Parameters of one build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildOpts {
    /// Requested number of pieces; the tessellation may differ slightly.
    pub piece_count: u32,
    /// Cut style.
    pub shape: PieceShape,
    /// Surface texture.
    pub material: Material,
    /// Bitmap pixels per virtual unit.
    pub scale: f64,
    /// RNG seed for start positions, tilts, orders and tab polarity.
    pub seed: u64,
    /// Id of the first piece; pieces are numbered consecutively from here.
    pub id_base: u32,
}

impl Default for BuildOpts {
    fn default() -> Self {
        Self {
            piece_count: 500,
            shape: PieceShape::default(),
            material: Material::default(),
            scale: 0.5,
            seed: 0,
            id_base: 0,
        }
    }
}

impl BuildOpts {
    fn validate(&self) -> RevealResult<()> {
        if self.piece_count == 0 || self.piece_count > MAX_PIECES {
            return Err(RevealError::validation(format!(
                "piece count must be in 1..={MAX_PIECES}, got {}",
                self.piece_count
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RevealError::validation("render scale must be finite and > 0"));
        }
        Ok(())
    }
}

/// Builds piece sets with a pluggable rasterizer.
#[derive(Clone, Debug, Default)]
pub struct PieceBuilder<R = CpuRasterizer> {
    rasterizer: R,
}

impl PieceBuilder<CpuRasterizer> {
    /// Builder using the CPU rasterizer.
    pub fn new() -> Self {
        Self::default()
    }
}

struct Draft {
    piece: Piece,
    outline: BezPath,
}

impl<R: PieceRasterizer> PieceBuilder<R> {
    /// Builder using `rasterizer`.
    pub fn with_rasterizer(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    /// Cut `image` into pieces.
    ///
    /// `progress` receives the rasterized fraction after each chunk and ends at exactly `1.0`.
    /// Individual bitmap failures are logged and leave that piece unrenderable; the build only
    /// fails on invalid options or when no piece could be rasterized at all.
    #[tracing::instrument(
        skip(self, image, progress),
        fields(count = opts.piece_count, shape = opts.shape.name(), material = opts.material.name())
    )]
    pub fn build(
        &self,
        image: &SourceImage,
        opts: &BuildOpts,
        progress: &mut dyn FnMut(f32),
    ) -> RevealResult<PieceSet> {
        opts.validate()?;
        let tess = tessellate(opts.shape, opts.piece_count)?;
        let mut rng = StdRng::seed_from_u64(opts.seed);

        let connections = (opts.shape == PieceShape::Jigsaw)
            .then(|| ConnectionGrid::random(tess.dims, &mut rng));

        let canvas = Canvas::for_scale(opts.scale)?;
        let texture = MaterialTexture::generate(
            opts.material,
            canvas.width,
            canvas.height,
            opts.scale,
            opts.seed,
        )?;
        let cover = image.cover_fit();
        let board = Size::new(VIRTUAL_WIDTH, VIRTUAL_HEIGHT);

        let id_end = u32::try_from(tess.cells.len())
            .ok()
            .and_then(|n| opts.id_base.checked_add(n));
        if id_end.is_none() {
            return Err(RevealError::validation(format!(
                "piece ids from {} overflow for {} cells",
                opts.id_base,
                tess.cells.len()
            )));
        }

        let mut drafts: Vec<Draft> = Vec::with_capacity(tess.cells.len());
        for (i, cell) in tess.cells.iter().enumerate() {
            let conn = connections
                .as_ref()
                .map(|g| g.get(cell.grid_x.max(0) as u32, cell.grid_y.max(0) as u32));
            let outline = shape::outline(opts.shape, tess.cell_size, cell.sub_index, conn);
            let target = cell.rect.origin();
            let source_rect = cover.canvas_to_source(
                shape::bitmap_bounds(&outline) + target.to_vec2(),
            );

            let u: f64 = rng.random();
            let start = Point::new(
                rng.random_range(-START_SPREAD_X..1.0 + START_SPREAD_X) * VIRTUAL_WIDTH,
                lerp(START_BAND.0, START_BAND.1, u.sqrt()) * VIRTUAL_HEIGHT,
            );
            let rotation = rng.random_range(-MAX_TILT..MAX_TILT);
            let z_order: f64 = rng.random();
            let center = target + Vec2::new(tess.cell_size.width / 2.0, tess.cell_size.height / 2.0);

            drafts.push(Draft {
                piece: Piece {
                    id: opts.id_base + i as u32,
                    source_rect,
                    target,
                    start,
                    size: tess.cell_size,
                    rotation,
                    z_order,
                    assembly_order: 0,
                    shape_sub_index: cell.sub_index,
                    connections: conn,
                    grid_x: cell.grid_x,
                    grid_y: cell.grid_y,
                    sector_index: sector_index(center),
                    bitmap: None,
                    wave_delay: diagonal_delay(target, board),
                },
                outline,
            });
        }

        let total = drafts.len();
        let mut done = 0usize;
        let mut failed = 0usize;
        for chunk in drafts.chunks_mut(BUILD_CHUNK) {
            let results: Vec<_> = chunk
                .par_iter()
                .map_init(RasterScratch::default, |scratch, d| {
                    let job = RasterJob {
                        piece_id: d.piece.id,
                        outline: &d.outline,
                        bounds: shape::bitmap_bounds(&d.outline),
                        cell_origin: d.piece.target,
                        scale: opts.scale,
                        image,
                        texture: &texture,
                    };
                    self.rasterizer.rasterize(&job, scratch)
                })
                .collect();
            for (d, res) in chunk.iter_mut().zip(results) {
                match res {
                    Ok(bitmap) => d.piece.bitmap = Some(bitmap),
                    Err(err) => {
                        failed += 1;
                        tracing::warn!(piece = d.piece.id, error = %err, "piece bitmap failed, skipping it");
                    }
                }
            }
            done += chunk.len();
            progress(done as f32 / total as f32);
        }

        if failed == total {
            return Err(RevealError::raster(format!(
                "none of the {total} pieces could be rasterized"
            )));
        }

        let mut pieces: Vec<Piece> = drafts.into_iter().map(|d| d.piece).collect();
        pieces.sort_by(|a, b| a.z_order.total_cmp(&b.z_order));

        let mut orders: Vec<u32> = (0..pieces.len() as u32).collect();
        orders.shuffle(&mut rng);
        for (piece, order) in pieces.iter_mut().zip(orders) {
            piece.assembly_order = order;
        }

        tracing::debug!(
            pieces = pieces.len(),
            failed,
            rows = tess.dims.rows,
            cols = tess.dims.cols,
            "piece set built"
        );
        Ok(PieceSet {
            pieces,
            dims: tess.dims,
            shape: opts.shape,
            material: opts.material,
            token: image.token(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pieces/builder.rs"]
mod tests;
