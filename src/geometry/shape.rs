use std::f64::consts::PI;

use kurbo::{BezPath, Point, Rect, Shape, Size};

use crate::geometry::jigsaw::{self, Connections};

/// Tessellation style used to cut the source image.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PieceShape {
    /// Uniform rectangles.
    Square,
    /// Each cell split along its diagonal into two right triangles.
    Triangle,
    /// Flat-top hexagons in offset columns.
    Hexagon,
    /// Rotated squares on a checkerboard lattice.
    Diamond,
    /// Masonry rows offset by half a brick.
    Brick,
    /// Arrow-like cells with zigzag sides.
    Chevron,
    /// True interlocking jigsaw pieces.
    #[default]
    Jigsaw,
}

impl PieceShape {
    /// Every shape, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Square,
        Self::Triangle,
        Self::Hexagon,
        Self::Diamond,
        Self::Brick,
        Self::Chevron,
        Self::Jigsaw,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Hexagon => "hexagon",
            Self::Diamond => "diamond",
            Self::Brick => "brick",
            Self::Chevron => "chevron",
            Self::Jigsaw => "jigsaw",
        }
    }

    /// How many pieces one grid cell yields on average; the grid is sized for
    /// `count / pieces_per_cell` cells.
    pub fn pieces_per_cell(self) -> u32 {
        match self {
            Self::Triangle | Self::Diamond => 2,
            _ => 1,
        }
    }

    fn bleed(self) -> f64 {
        match self {
            Self::Square | Self::Brick | Self::Chevron => RECT_BLEED,
            Self::Triangle => TRIANGLE_BLEED,
            Self::Hexagon => HEX_BLEED,
            Self::Diamond => DIAMOND_BLEED,
            Self::Jigsaw => 0.0,
        }
    }
}

const RECT_BLEED: f64 = 0.5;
const TRIANGLE_BLEED: f64 = 0.5;
const HEX_BLEED: f64 = 0.75;
const DIAMOND_BLEED: f64 = 0.75;

/// Horizontal depth of a chevron's zigzag as a fraction of its height.
pub const CHEVRON_NOTCH: f64 = 0.3;

/// Extra margin around an outline so the baked edge stroke is not cut off.
const STROKE_MARGIN: f64 = 2.0;

/// Clip path of one piece in cell-local coordinates (cell top-left at the origin).
pub fn outline(
    shape: PieceShape,
    size: Size,
    sub_index: u8,
    connections: Option<Connections>,
) -> BezPath {
    let (w, h) = (size.width, size.height);
    let b = shape.bleed();
    match shape {
        PieceShape::Square | PieceShape::Brick => Rect::new(-b, -b, w + b, h + b).to_path(0.1),
        PieceShape::Hexagon => {
            let c = Point::new(w / 2.0, h / 2.0);
            let r = w / 2.0 + b;
            polygon((0..6).map(|k| {
                let a = f64::from(k) * PI / 3.0;
                Point::new(c.x + r * a.cos(), c.y + r * a.sin())
            }))
        }
        PieceShape::Diamond => polygon([
            Point::new(w / 2.0, -b),
            Point::new(w + b, h / 2.0),
            Point::new(w / 2.0, h + b),
            Point::new(-b, h / 2.0),
        ]),
        PieceShape::Chevron => {
            let notch = CHEVRON_NOTCH * h;
            polygon([
                Point::new(-b, -b),
                Point::new(w + b, -b),
                Point::new(w + notch + b, h / 2.0),
                Point::new(w + b, h + b),
                Point::new(-b, h + b),
                Point::new(notch - b, h / 2.0),
            ])
        }
        PieceShape::Triangle => {
            if sub_index == 0 {
                polygon([
                    Point::new(-b, -b),
                    Point::new(w + b, -b),
                    Point::new(-b, h + b),
                ])
            } else {
                polygon([
                    Point::new(w + b, -b),
                    Point::new(w + b, h + b),
                    Point::new(-b, h + b),
                ])
            }
        }
        PieceShape::Jigsaw => jigsaw::piece_outline(size, connections.unwrap_or_default()),
    }
}

/// Pixel-aligned bitmap extent for `outline`, in cell-local coordinates.
pub fn bitmap_bounds(outline: &BezPath) -> Rect {
    outline
        .bounding_box()
        .inflate(STROKE_MARGIN, STROKE_MARGIN)
        .expand()
}

fn polygon(points: impl IntoIterator<Item = Point>) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.into_iter().enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/shape.rs"]
mod tests;
