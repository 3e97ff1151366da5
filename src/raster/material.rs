//! Material textures baked into every piece bitmap.
//!
//! A texture is a translucent premultiplied layer covering the whole virtual canvas. Pieces
//! composite it source-over inside their clip, so the grain runs continuously across
//! neighbors the way it would on a physical board.

use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::RevealResult;
use crate::raster::cpu;

/// Surface finish of the puzzle.
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
pub enum Material {
    /// Warm speckled pulp.
    #[default]
    Cardboard,
    /// Flowing grain lines.
    Wood,
    /// Diagonal specular sheen.
    Glass,
    /// Woven twill checker.
    CarbonFiber,
}

impl Material {
    /// Every material, in declaration order.
    pub const ALL: [Self; 4] = [Self::Cardboard, Self::Wood, Self::Glass, Self::CarbonFiber];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cardboard => "cardboard",
            Self::Wood => "wood",
            Self::Glass => "glass",
            Self::CarbonFiber => "carbon_fiber",
        }
    }

    /// Edge stroke color baked around each piece.
    pub fn edge_color(self) -> Rgba8 {
        match self {
            Self::Cardboard => Rgba8::rgba(40, 28, 16, 90),
            Self::Wood => Rgba8::rgba(60, 34, 12, 110),
            Self::Glass => Rgba8::rgba(255, 255, 255, 120),
            Self::CarbonFiber => Rgba8::rgba(0, 0, 0, 140),
        }
    }

    /// Straight-alpha texel at pixel (`x`, `y`) of a texture rendered at `scale` pixels per unit.
    fn texel(self, x: u32, y: u32, scale: f64, seed: u64) -> Rgba8 {
        let (ux, uy) = (f64::from(x) / scale, f64::from(y) / scale);
        match self {
            Self::Cardboard => {
                let n = hash_unit(x, y, seed);
                if n > 0.94 {
                    Rgba8::rgba(70, 48, 24, 46)
                } else if n < 0.05 {
                    Rgba8::rgba(255, 246, 228, 30)
                } else {
                    Rgba8::rgba(176, 140, 96, 16)
                }
            }
            Self::Wood => {
                let jitter = hash_unit(x / 3, y, seed) * 0.6;
                let grain = 0.5 + 0.5 * (uy * 0.09 + (ux * 0.013).sin() * 4.0 + jitter).sin();
                Rgba8::rgba(112, 72, 34, (10.0 + grain * 34.0) as u8)
            }
            Self::Glass => {
                let band = ((ux - uy * 0.45).rem_euclid(GLASS_SHEEN_PERIOD) / GLASS_SHEEN_PERIOD - 0.5)
                    .abs();
                let sheen = (1.0 - band * 6.0).max(0.0);
                Rgba8::rgba(255, 255, 255, (14.0 + sheen * 64.0) as u8)
            }
            Self::CarbonFiber => {
                let cell = (ux / CARBON_WEAVE) as i64 + (uy / CARBON_WEAVE) as i64;
                let along = if cell % 2 == 0 {
                    (ux / CARBON_WEAVE).fract()
                } else {
                    (uy / CARBON_WEAVE).fract()
                };
                let shade = (40.0 + along * 30.0) as u8;
                Rgba8::rgba(shade / 4, shade / 4, shade / 3, 70 + shade / 2)
            }
        }
    }
}

const GLASS_SHEEN_PERIOD: f64 = 260.0;
const CARBON_WEAVE: f64 = 6.0;

/// Canvas-sized texture for one material, shared by every piece of a build.
#[derive(Clone)]
pub struct MaterialTexture {
    material: Material,
    scale: f64,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl MaterialTexture {
    /// Generate the texture for a `width` x `height` pixel canvas at `scale` pixels per unit.
    pub fn generate(
        material: Material,
        width: u32,
        height: u32,
        scale: f64,
        seed: u64,
    ) -> RevealResult<Self> {
        let mut bytes = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for y in 0..height {
            for x in 0..width {
                let p = material.texel(x, y, scale, seed).premultiplied();
                bytes.extend_from_slice(&p.to_array());
            }
        }
        let pixmap = cpu::pixmap_from_premul_bytes(&bytes, width, height)?;
        Ok(Self {
            material,
            scale,
            pixmap: Arc::new(pixmap),
        })
    }

    /// Material this texture depicts.
    pub fn material(&self) -> Material {
        self.material
    }

    /// Texture pixels per virtual unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        cpu::image_paint(self.pixmap.clone())
    }
}

/// Deterministic per-pixel noise in `[0, 1)`.
fn hash_unit(x: u32, y: u32, seed: u64) -> f64 {
    let mut h = seed ^ (u64::from(x) << 32 | u64::from(y));
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    (h >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
#[path = "../../tests/unit/raster/material.rs"]
mod tests;
