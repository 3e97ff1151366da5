//! Interlocking tab geometry.
//!
//! Each internal grid edge carries one polarity: `+1` bulges out of the piece (a tab), `-1`
//! bulges into it (a blank) and `0` is a flat border edge. Neighbors always see opposite
//! polarities on their shared edge, and the tab curve is mirror-symmetric about the edge
//! midpoint, so a tab traced by one piece and the blank traced (in reverse) by its neighbor
//! are the same curve.

use kurbo::{BezPath, Point, Size, Vec2};
use rand::Rng;

use crate::geometry::grid::GridDims;

/// Tab depth as a fraction of the edge length.
pub const TAB_DEPTH: f64 = 0.22;
/// Neck width as a fraction of the edge length.
pub const TAB_NECK: f64 = 0.15;
/// Head width as a fraction of the edge length.
pub const TAB_HEAD: f64 = 0.32;

const NECK_L: f64 = 0.5 - TAB_NECK / 2.0;
const NECK_R: f64 = 0.5 + TAB_NECK / 2.0;
const HEAD_L: f64 = 0.5 - TAB_HEAD / 2.0;
const HEAD_R: f64 = 0.5 + TAB_HEAD / 2.0;
const BASE_L: f64 = NECK_L - 0.075;
const BASE_R: f64 = NECK_R + 0.075;

// (along-edge, out-of-edge) control points in units of (edge length, tab depth):
// neck -> shoulder -> peak -> shoulder -> neck. Adjacent handles are collinear at every join.
const TAB_CURVE: [[(f64, f64); 3]; 6] = [
    [(NECK_L + 0.025, 0.0), (NECK_L + 0.015, 0.2), (NECK_L, 0.35)],
    [(NECK_L - 0.015, 0.5), (HEAD_L, 0.55), (HEAD_L, 0.72)],
    [(HEAD_L, 0.9), (0.40, 1.0), (0.5, 1.0)],
    [(0.60, 1.0), (HEAD_R, 0.9), (HEAD_R, 0.72)],
    [(HEAD_R, 0.55), (NECK_R + 0.015, 0.5), (NECK_R, 0.35)],
    [(NECK_R - 0.015, 0.2), (NECK_R - 0.025, 0.0), (BASE_R, 0.0)],
];

/// Edge polarities of one jigsaw piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Connections {
    /// Top edge.
    pub top: i8,
    /// Right edge.
    pub right: i8,
    /// Bottom edge.
    pub bottom: i8,
    /// Left edge.
    pub left: i8,
}

/// Polarity assignment for a whole grid.
#[derive(Clone, Debug)]
pub struct ConnectionGrid {
    dims: GridDims,
    cells: Vec<Connections>,
}

impl ConnectionGrid {
    /// Visit every internal edge once, pick a random polarity and mirror it onto the neighbor.
    pub fn random<R: Rng + ?Sized>(dims: GridDims, rng: &mut R) -> Self {
        let (rows, cols) = (dims.rows as usize, dims.cols as usize);
        let mut cells = vec![Connections::default(); rows * cols];
        for y in 0..rows {
            for x in 0..cols {
                let i = y * cols + x;
                if x + 1 < cols {
                    let p = random_polarity(rng);
                    cells[i].right = p;
                    cells[i + 1].left = -p;
                }
                if y + 1 < rows {
                    let p = random_polarity(rng);
                    cells[i].bottom = p;
                    cells[i + cols].top = -p;
                }
            }
        }
        Self { dims, cells }
    }

    /// Grid the polarities were generated for.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Polarities of the cell at (`col`, `row`); flat edges outside the grid.
    pub fn get(&self, col: u32, row: u32) -> Connections {
        if col >= self.dims.cols || row >= self.dims.rows {
            return Connections::default();
        }
        self.cells[(row * self.dims.cols + col) as usize]
    }
}

fn random_polarity<R: Rng + ?Sized>(rng: &mut R) -> i8 {
    if rng.random_bool(0.5) { 1 } else { -1 }
}

/// Closed outline of a `size` piece with its top-left corner at the origin.
pub fn piece_outline(size: Size, connections: Connections) -> BezPath {
    let (w, h) = (size.width, size.height);
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];
    let polarities = [
        connections.top,
        connections.right,
        connections.bottom,
        connections.left,
    ];

    let mut path = BezPath::new();
    path.move_to(corners[0]);
    for (i, &polarity) in polarities.iter().enumerate() {
        edge_to(&mut path, corners[i], corners[(i + 1) % 4], polarity);
    }
    path.close_path();
    path
}

/// Append the edge from `from` to `to` (clockwise traversal) to `path`.
fn edge_to(path: &mut BezPath, from: Point, to: Point, polarity: i8) {
    let span = to - from;
    let len = span.hypot();
    if polarity == 0 || len <= f64::EPSILON {
        path.line_to(to);
        return;
    }

    let along = span / len;
    // Clockwise in y-down space: the outward normal is the direction rotated a quarter turn.
    let outward = Vec2::new(along.y, -along.x);
    let depth = TAB_DEPTH * len * f64::from(polarity.signum());
    let at = |(s, h): (f64, f64)| from + along * (s * len) + outward * (h * depth);

    path.line_to(at((BASE_L, 0.0)));
    for [c1, c2, p] in TAB_CURVE {
        path.curve_to(at(c1), at(c2), at(p));
    }
    path.line_to(to);
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/jigsaw.rs"]
mod tests;
