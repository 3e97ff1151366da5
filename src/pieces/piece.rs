use crate::animation::motion::MotionPath;
use crate::foundation::core::{Point, Rect, Size, Vec2};
use crate::geometry::grid::GridDims;
use crate::geometry::jigsaw::Connections;
use crate::geometry::shape::PieceShape;
use crate::raster::bitmap::PieceBitmap;
use crate::raster::image::ImageToken;
use crate::raster::material::Material;

/// One cut of the source image.
///
/// Geometry is fixed at build time. Per-frame state (trails, physics bodies, snap tracking) is
/// kept elsewhere, keyed by [`Piece::id`].
#[derive(Clone, Debug)]
pub struct Piece {
    /// Stable identity within a piece set.
    pub id: u32,
    /// Source-pixel rectangle the bitmap samples, bleed included.
    pub source_rect: Rect,
    /// Resting top-left position on the virtual canvas.
    pub target: Point,
    /// Scattered starting center.
    pub start: Point,
    /// Cell size in virtual units.
    pub size: Size,
    /// Initial tilt in radians.
    pub rotation: f64,
    /// Draw-order key; the set is sorted by it once.
    pub z_order: f64,
    /// Stagger slot in `[0, N)`.
    pub assembly_order: u32,
    /// Half selector for split cells.
    pub shape_sub_index: u8,
    /// Tab polarities, jigsaw only.
    pub connections: Option<Connections>,
    /// Tessellation column.
    pub grid_x: i32,
    /// Tessellation row.
    pub grid_y: i32,
    /// Coarse 3x3 canvas sector of the target center.
    pub sector_index: u32,
    /// Baked bitmap; `None` when rasterization failed.
    pub bitmap: Option<PieceBitmap>,
    pub(crate) wave_delay: f64,
}

impl Piece {
    /// Resting rectangle on the canvas.
    pub fn target_rect(&self) -> Rect {
        Rect::from_origin_size(self.target, self.size)
    }

    /// Resting center on the canvas.
    pub fn target_center(&self) -> Point {
        self.target + Vec2::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Endpoints for the motion model.
    pub fn motion_path(&self) -> MotionPath {
        MotionPath {
            start: self.start,
            target: self.target_center(),
            rotation: self.rotation,
        }
    }

    /// Normalized diagonal distance `(tx + ty) / (W + H)`, fixed at build time.
    pub fn wave_delay(&self) -> f64 {
        self.wave_delay
    }

    /// Whether the piece has a bitmap to draw.
    pub fn is_renderable(&self) -> bool {
        self.bitmap.is_some()
    }
}

/// Diagonal wave delay of a piece resting at `target` on a `canvas`-sized board.
pub(crate) fn diagonal_delay(target: Point, canvas: Size) -> f64 {
    let span = canvas.width + canvas.height;
    if span > 0.0 {
        (target.x + target.y) / span
    } else {
        0.0
    }
}

/// Every piece cut from one image, sorted by `z_order`.
#[derive(Clone, Debug)]
pub struct PieceSet {
    pub(crate) pieces: Vec<Piece>,
    pub(crate) dims: GridDims,
    pub(crate) shape: PieceShape,
    pub(crate) material: Material,
    pub(crate) token: ImageToken,
}

impl PieceSet {
    /// Pieces in draw order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Number of pieces, renderable or not.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Whether the set has no pieces.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Pieces that have a bitmap.
    pub fn renderable_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_renderable()).count()
    }

    /// Grid the tessellation was derived from.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Shape the pieces were cut in.
    pub fn shape(&self) -> PieceShape {
        self.shape
    }

    /// Material baked into the bitmaps.
    pub fn material(&self) -> Material {
        self.material
    }

    /// Token of the image the set was built from.
    pub fn token(&self) -> ImageToken {
        self.token
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pieces/piece.rs"]
mod tests;
