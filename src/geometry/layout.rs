use kurbo::{Point, Rect, Size};

use crate::foundation::core::{VIRTUAL_HEIGHT, VIRTUAL_WIDTH, virtual_rect};
use crate::foundation::error::{RevealError, RevealResult};
use crate::geometry::grid::{GridDims, grid_for_count};
use crate::geometry::shape::PieceShape;

/// Horizontal spacing of hexagon columns as a fraction of hexagon width.
pub const HEX_COLUMN_STEP: f64 = 0.75;

/// Number of sector columns and rows the canvas is divided into.
pub const SECTOR_DIVISIONS: u32 = 3;

/// One retained tessellation cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPlacement {
    /// Column (or lattice x) coordinate.
    pub grid_x: i32,
    /// Row (or lattice y) coordinate.
    pub grid_y: i32,
    /// Which half of a split cell this is.
    pub sub_index: u8,
    /// Target rectangle on the virtual canvas.
    pub rect: Rect,
}

/// Layout of every piece for one shape.
#[derive(Clone, Debug)]
pub struct Tessellation {
    /// Grid the layout was derived from.
    pub dims: GridDims,
    /// Size shared by every cell.
    pub cell_size: Size,
    /// Retained cells in generation order.
    pub cells: Vec<CellPlacement>,
}

/// Lay out roughly `count` pieces of `shape` over the virtual canvas.
pub fn tessellate(shape: PieceShape, count: u32) -> RevealResult<Tessellation> {
    let effective = count.div_ceil(shape.pieces_per_cell()).max(1);
    let dims = grid_for_count(effective, VIRTUAL_WIDTH / VIRTUAL_HEIGHT)?;
    let uniform = Size::new(
        VIRTUAL_WIDTH / f64::from(dims.cols),
        VIRTUAL_HEIGHT / f64::from(dims.rows),
    );

    let (cell_size, cells) = match shape {
        PieceShape::Square | PieceShape::Chevron | PieceShape::Jigsaw => {
            (uniform, uniform_cells(dims, uniform, 1))
        }
        PieceShape::Triangle => (uniform, uniform_cells(dims, uniform, 2)),
        PieceShape::Hexagon => hexagon_cells(dims),
        PieceShape::Brick => (uniform, brick_cells(dims, uniform)),
        PieceShape::Diamond => (uniform, diamond_cells(dims, uniform)),
    };

    if cells.is_empty() {
        return Err(RevealError::geometry(format!(
            "{} tessellation of {count} pieces produced no cells",
            shape.name()
        )));
    }
    Ok(Tessellation {
        dims,
        cell_size,
        cells,
    })
}

/// Coarse canvas sector (row-major over a 3x3 split) containing `p`.
pub fn sector_index(p: Point) -> u32 {
    let div = f64::from(SECTOR_DIVISIONS);
    let max = SECTOR_DIVISIONS - 1;
    let col = ((p.x / VIRTUAL_WIDTH * div).floor().max(0.0) as u32).min(max);
    let row = ((p.y / VIRTUAL_HEIGHT * div).floor().max(0.0) as u32).min(max);
    row * SECTOR_DIVISIONS + col
}

fn overlaps_canvas(rect: Rect) -> bool {
    let i = rect.intersect(virtual_rect());
    i.width() > 1e-6 && i.height() > 1e-6
}

fn cell_rect(origin: Point, size: Size) -> Rect {
    Rect::from_origin_size(origin, size)
}

fn uniform_cells(dims: GridDims, size: Size, subs: u8) -> Vec<CellPlacement> {
    let mut out = Vec::with_capacity((dims.cells() * u32::from(subs)) as usize);
    for y in 0..dims.rows as i32 {
        for x in 0..dims.cols as i32 {
            let rect = cell_rect(
                Point::new(f64::from(x) * size.width, f64::from(y) * size.height),
                size,
            );
            for sub_index in 0..subs {
                out.push(CellPlacement {
                    grid_x: x,
                    grid_y: y,
                    sub_index,
                    rect,
                });
            }
        }
    }
    out
}

fn hexagon_cells(dims: GridDims) -> (Size, Vec<CellPlacement>) {
    let cols = f64::from(dims.cols);
    let pw = VIRTUAL_WIDTH / (HEX_COLUMN_STEP * (cols - 1.0) + 1.0);
    let ph = pw * 3f64.sqrt() / 2.0;
    let size = Size::new(pw, ph);
    let rows = (VIRTUAL_HEIGHT / ph).ceil() as i32 + 1;

    let mut out = Vec::new();
    for x in 0..dims.cols as i32 {
        let shift = if x % 2 == 1 { ph / 2.0 } else { 0.0 };
        for y in -1..rows {
            let origin = Point::new(
                f64::from(x) * pw * HEX_COLUMN_STEP,
                f64::from(y) * ph + shift,
            );
            let rect = cell_rect(origin, size);
            if overlaps_canvas(rect) {
                out.push(CellPlacement {
                    grid_x: x,
                    grid_y: y,
                    sub_index: 0,
                    rect,
                });
            }
        }
    }
    (size, out)
}

fn brick_cells(dims: GridDims, size: Size) -> Vec<CellPlacement> {
    let mut out = Vec::new();
    for y in 0..dims.rows as i32 {
        let offset = if y % 2 == 1 { -size.width / 2.0 } else { 0.0 };
        for x in 0..=dims.cols as i32 {
            let origin = Point::new(f64::from(x) * size.width + offset, f64::from(y) * size.height);
            let rect = cell_rect(origin, size);
            if overlaps_canvas(rect) {
                out.push(CellPlacement {
                    grid_x: x,
                    grid_y: y,
                    sub_index: 0,
                    rect,
                });
            }
        }
    }
    out
}

fn diamond_cells(dims: GridDims, size: Size) -> Vec<CellPlacement> {
    let mut out = Vec::new();
    // Lattice points sit on a half-cell grid; only even-parity points get a diamond.
    for y in 0..=(2 * dims.rows) as i32 {
        for x in 0..=(2 * dims.cols) as i32 {
            if (x + y) % 2 != 0 {
                continue;
            }
            let center = Point::new(
                f64::from(x) * size.width / 2.0,
                f64::from(y) * size.height / 2.0,
            );
            let rect = Rect::from_center_size(center, size);
            if overlaps_canvas(rect) {
                out.push(CellPlacement {
                    grid_x: x,
                    grid_y: y,
                    sub_index: 0,
                    rect,
                });
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/layout.rs"]
mod tests;
