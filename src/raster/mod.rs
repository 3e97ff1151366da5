/// Rasterization of piece outlines into immutable bitmaps.
pub mod bitmap;
/// Separable gaussian blur over premultiplied RGBA8.
pub mod blur;
pub(crate) mod cpu;
/// Decoded source images and cover-fit mapping.
pub mod image;
/// Material texture overlays.
pub mod material;
