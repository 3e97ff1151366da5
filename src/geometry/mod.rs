/// Row/column sizing for a requested piece count.
pub mod grid;
/// Interlocking tab polarity and Bezier edges.
pub mod jigsaw;
/// Per-shape cell placement.
pub mod layout;
/// Piece shapes and their clip paths.
pub mod shape;
