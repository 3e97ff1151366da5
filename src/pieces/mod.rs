/// Batch construction of a piece set from a source image.
pub mod builder;
/// Piece records and the immutable piece set.
pub mod piece;
