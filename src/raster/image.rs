use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{Affine, Rect, VIRTUAL_HEIGHT, VIRTUAL_WIDTH, Vec2};
use crate::foundation::error::{RevealError, RevealResult};
use crate::raster::cpu;

/// Identity of a loaded source image; a piece build is only installed while its token is current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ImageToken(pub u64);

/// Decoded, premultiplied source image shared by every piece and the background.
#[derive(Clone)]
pub struct SourceImage {
    width: u32,
    height: u32,
    premul: Arc<Vec<u8>>,
    pixmap: Arc<vello_cpu::Pixmap>,
    token: ImageToken,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("token", &self.token)
            .finish()
    }
}

impl SourceImage {
    /// Decode encoded image bytes (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> RevealResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> RevealResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read source image '{}'", path.display()))?;
        Self::decode(&bytes)
    }

    /// Wrap straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> RevealResult<Self> {
        if width == 0 || height == 0 {
            return Err(RevealError::validation("source image must be non-empty"));
        }
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return Err(RevealError::validation(format!(
                "source image expects {width}x{height} rgba8 pixels, got {} bytes",
                rgba.len()
            )));
        }
        cpu::premultiply_rgba8_in_place(&mut rgba);
        let token = ImageToken(
            xxhash_rust::xxh3::xxh3_64(&rgba) ^ (u64::from(width) << 32 | u64::from(height)),
        );
        let pixmap = cpu::pixmap_from_premul_bytes(&rgba, width, height)?;
        Ok(Self {
            width,
            height,
            premul: Arc::new(rgba),
            pixmap: Arc::new(pixmap),
            token,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Content hash of the pixels.
    pub fn token(&self) -> ImageToken {
        self.token
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn premul_rgba8(&self) -> &[u8] {
        &self.premul
    }

    /// Cover-fit placement on the virtual canvas.
    pub fn cover_fit(&self) -> CoverFit {
        CoverFit::new(self.width, self.height)
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        cpu::image_paint(self.pixmap.clone())
    }
}

/// Uniform scale plus centering offset that makes an image cover the virtual canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Canvas units per image pixel.
    pub scale: f64,
    /// Canvas position of the image's top-left corner.
    pub offset: Vec2,
}

impl CoverFit {
    /// Fit for a `width` x `height` image.
    pub fn new(width: u32, height: u32) -> Self {
        let (iw, ih) = (f64::from(width.max(1)), f64::from(height.max(1)));
        let scale = (VIRTUAL_WIDTH / iw).max(VIRTUAL_HEIGHT / ih);
        let offset = Vec2::new(
            (VIRTUAL_WIDTH - iw * scale) / 2.0,
            (VIRTUAL_HEIGHT - ih * scale) / 2.0,
        );
        Self { scale, offset }
    }

    /// Image pixel space to virtual canvas space.
    pub fn image_to_canvas(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Source-pixel rectangle sampled by a canvas rectangle.
    pub fn canvas_to_source(&self, r: Rect) -> Rect {
        Rect::new(
            (r.x0 - self.offset.x) / self.scale,
            (r.y0 - self.offset.y) / self.scale,
            (r.x1 - self.offset.x) / self.scale,
            (r.y1 - self.offset.y) / self.scale,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/image.rs"]
mod tests;
