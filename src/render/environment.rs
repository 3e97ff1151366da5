//! Backdrop drawn before any piece: solid fill, a blurred and darkened cover-fit copy of the
//! source image, a slow diagonal light sweep, drifting dust and a vignette.

use std::f64::consts::TAU;
use std::sync::Arc;

use kurbo::{Circle, Point, Shape};

use crate::foundation::core::{Affine, Rgba8, VIRTUAL_HEIGHT, VIRTUAL_WIDTH, Vec2, virtual_rect};
use crate::foundation::error::RevealResult;
use crate::foundation::math::mul_div255_u8;
use crate::raster::blur::{blur_rgba8_premul, sigma_for_radius};
use crate::raster::cpu;
use crate::raster::image::{ImageToken, SourceImage};

/// Solid fill under everything.
pub const BACKGROUND_COLOR: Rgba8 = Rgba8::rgb(10, 10, 16);

/// Virtual units per backdrop pixel; the blurred copy is tiny and upscaled.
const BACKDROP_DOWNSAMPLE: f64 = 10.0;
const BACKDROP_BLUR_RADIUS: u32 = 6;
/// Brightness multiplier, in 1/255 steps.
const BACKDROP_DARKEN: u16 = 120;
const BACKDROP_SATURATION: f64 = 1.35;

const SWEEP_PERIOD_MS: f64 = 9_000.0;
const SWEEP_WIDTH: f64 = 520.0;
const SWEEP_ANGLE: f64 = -0.45;
const SWEEP_PEAK_ALPHA: f64 = 0.10;

/// Number of ambient dust motes.
pub const DUST_COUNT: usize = 60;

/// Distance past the top and bottom edges where motes wrap around.
const DUST_MARGIN: f64 = 20.0;

const VIGNETTE_STRENGTH: f64 = 0.78;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Dust {
    x: f64,
    y: f64,
    radius: f64,
    rise_per_ms: f64,
    drift: f64,
    phase: f64,
    alpha: f64,
}

impl Dust {
    fn position(&self, elapsed_ms: f64) -> (f64, f64) {
        let span = VIRTUAL_HEIGHT + 2.0 * DUST_MARGIN;
        let y = (self.y - self.rise_per_ms * elapsed_ms).rem_euclid(span) - DUST_MARGIN;
        let x = self.x + (elapsed_ms / 1800.0 + self.phase).sin() * self.drift;
        (x, y)
    }
}

struct Backdrop {
    token: ImageToken,
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

/// Stateful backdrop renderer. Only the dust set and the per-image blurred copy persist.
pub struct EnvironmentRenderer {
    dust: Vec<Dust>,
    backdrop: Option<Backdrop>,
    sweep: Option<vello_cpu::Image>,
    vignette: Option<vello_cpu::Image>,
}

impl std::fmt::Debug for EnvironmentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentRenderer")
            .field("dust", &self.dust.len())
            .field("backdrop", &self.backdrop.as_ref().map(|b| b.token))
            .finish()
    }
}

impl EnvironmentRenderer {
    /// Renderer with a dust field derived from `seed`.
    pub fn new(seed: u64) -> Self {
        let dust = (0..DUST_COUNT as u64)
            .map(|i| {
                let r = |k: u64| unit_hash(seed, i * 8 + k);
                Dust {
                    x: r(0) * VIRTUAL_WIDTH,
                    y: r(1) * VIRTUAL_HEIGHT,
                    radius: 1.5 + r(2) * 3.5,
                    rise_per_ms: 0.008 + r(3) * 0.03,
                    drift: 6.0 + r(4) * 22.0,
                    phase: r(5) * TAU,
                    alpha: 0.12 + r(6) * 0.3,
                }
            })
            .collect();
        Self {
            dust,
            backdrop: None,
            sweep: None,
            vignette: None,
        }
    }

    /// Number of dust motes.
    pub fn dust_count(&self) -> usize {
        self.dust.len()
    }

    /// Forget the blurred copy of the previous image.
    pub fn reset(&mut self) {
        self.backdrop = None;
    }

    /// Draw the backdrop under `base` (virtual units to output pixels).
    pub(crate) fn render(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        base: Affine,
        image: Option<&SourceImage>,
        elapsed_ms: f64,
    ) {
        ctx.set_transform(cpu::affine_to_cpu(base));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu::color_to_cpu(BACKGROUND_COLOR));
        ctx.fill_rect(&cpu::rect_to_cpu(virtual_rect()));

        if let Some(image) = image
            && let Err(err) = self.ensure_backdrop(image)
        {
            tracing::warn!(error = %err, "backdrop generation failed");
        }
        if let Some(b) = &self.backdrop {
            ctx.set_transform(cpu::affine_to_cpu(base * Affine::scale(BACKDROP_DOWNSAMPLE)));
            ctx.set_paint(b.paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(b.width),
                f64::from(b.height),
            ));
        }

        self.render_sweep(ctx, base, elapsed_ms);
        self.render_dust(ctx, base, elapsed_ms);
        self.render_vignette(ctx, base);
    }

    fn ensure_backdrop(&mut self, image: &SourceImage) -> RevealResult<()> {
        if self.backdrop.as_ref().is_some_and(|b| b.token == image.token()) {
            return Ok(());
        }
        let width = (VIRTUAL_WIDTH / BACKDROP_DOWNSAMPLE).ceil() as u32;
        let height = (VIRTUAL_HEIGHT / BACKDROP_DOWNSAMPLE).ceil() as u32;
        let (w, h) = cpu::dims_u16(width, height)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(cpu::affine_to_cpu(Affine::scale(1.0 / BACKDROP_DOWNSAMPLE)));
        ctx.set_paint_transform(cpu::affine_to_cpu(image.cover_fit().image_to_canvas()));
        ctx.set_paint(image.paint());
        ctx.fill_rect(&cpu::rect_to_cpu(virtual_rect()));
        ctx.flush();
        let mut small = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut small);

        let mut bytes = blur_rgba8_premul(
            small.data_as_u8_slice(),
            width,
            height,
            BACKDROP_BLUR_RADIUS,
            sigma_for_radius(BACKDROP_BLUR_RADIUS),
        )?;
        for px in bytes.chunks_exact_mut(4) {
            grade_pixel(px);
        }
        let pixmap = cpu::pixmap_from_premul_bytes(&bytes, width, height)?;
        self.backdrop = Some(Backdrop {
            token: image.token(),
            paint: cpu::image_paint(Arc::new(pixmap)),
            width,
            height,
        });
        Ok(())
    }

    fn render_sweep(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        base: Affine,
        elapsed_ms: f64,
    ) {
        let paint = match &self.sweep {
            Some(p) => p.clone(),
            None => match sweep_strip() {
                Ok(p) => self.sweep.insert(p).clone(),
                Err(err) => {
                    tracing::warn!(error = %err, "light sweep generation failed");
                    return;
                }
            },
        };
        let travel = VIRTUAL_WIDTH + SWEEP_WIDTH * 2.0;
        let phase = (elapsed_ms / SWEEP_PERIOD_MS * TAU).sin() * 0.5 + 0.5;
        let x = -SWEEP_WIDTH + phase * travel;
        let band = base
            * Affine::translate(Vec2::new(x, VIRTUAL_HEIGHT / 2.0))
            * Affine::rotate(SWEEP_ANGLE)
            * Affine::translate(Vec2::new(-SWEEP_WIDTH / 2.0, -VIRTUAL_HEIGHT))
            * Affine::scale_non_uniform(
                SWEEP_WIDTH / f64::from(SWEEP_STRIP_PX),
                VIRTUAL_HEIGHT * 2.0,
            );
        ctx.set_transform(cpu::affine_to_cpu(band));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(SWEEP_STRIP_PX),
            1.0,
        ));
    }

    fn render_dust(&self, ctx: &mut vello_cpu::RenderContext, base: Affine, elapsed_ms: f64) {
        ctx.set_transform(cpu::affine_to_cpu(base));
        let elapsed = elapsed_ms.max(0.0);
        for d in &self.dust {
            let (x, y) = d.position(elapsed);
            let twinkle = 0.75 + 0.25 * (elapsed / 700.0 + d.phase * 3.0).sin();
            ctx.set_paint(cpu::color_to_cpu(
                Rgba8::rgb(255, 244, 220).with_opacity(d.alpha * twinkle),
            ));
            let mote = Circle::new(Point::new(x, y), d.radius).to_path(0.1);
            ctx.fill_path(&cpu::bezpath_to_cpu(&mote));
        }
    }

    fn render_vignette(&mut self, ctx: &mut vello_cpu::RenderContext, base: Affine) {
        let paint = match &self.vignette {
            Some(p) => p.clone(),
            None => match vignette_image() {
                Ok(p) => self.vignette.insert(p).clone(),
                Err(err) => {
                    tracing::warn!(error = %err, "vignette generation failed");
                    return;
                }
            },
        };
        let sx = VIRTUAL_WIDTH / f64::from(VIGNETTE_PX.0);
        let sy = VIRTUAL_HEIGHT / f64::from(VIGNETTE_PX.1);
        ctx.set_transform(cpu::affine_to_cpu(base * Affine::scale_non_uniform(sx, sy)));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(VIGNETTE_PX.0),
            f64::from(VIGNETTE_PX.1),
        ));
    }
}

const SWEEP_STRIP_PX: u32 = 64;
const VIGNETTE_PX: (u32, u32) = (54, 114);

/// Darken and boost saturation of one premultiplied pixel in place.
fn grade_pixel(px: &mut [u8]) {
    let (r, g, b) = (f64::from(px[0]), f64::from(px[1]), f64::from(px[2]));
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    let a = f64::from(px[3]);
    let sat = |c: f64| (luma + (c - luma) * BACKDROP_SATURATION).clamp(0.0, a) as u16;
    px[0] = mul_div255_u8(sat(r), BACKDROP_DARKEN);
    px[1] = mul_div255_u8(sat(g), BACKDROP_DARKEN);
    px[2] = mul_div255_u8(sat(b), BACKDROP_DARKEN);
}

fn sweep_strip() -> RevealResult<vello_cpu::Image> {
    let mut bytes = Vec::with_capacity(SWEEP_STRIP_PX as usize * 4);
    for x in 0..SWEEP_STRIP_PX {
        let t = (f64::from(x) + 0.5) / f64::from(SWEEP_STRIP_PX);
        let bump = (t * std::f64::consts::PI).sin().powi(2);
        let c = Rgba8::rgb(255, 250, 235)
            .with_opacity(bump * SWEEP_PEAK_ALPHA)
            .premultiplied();
        bytes.extend_from_slice(&c.to_array());
    }
    let pixmap = cpu::pixmap_from_premul_bytes(&bytes, SWEEP_STRIP_PX, 1)?;
    Ok(cpu::image_paint(Arc::new(pixmap)))
}

fn vignette_image() -> RevealResult<vello_cpu::Image> {
    let (w, h) = VIGNETTE_PX;
    let mut bytes = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let dx = (f64::from(x) + 0.5) / f64::from(w) * 2.0 - 1.0;
            let dy = (f64::from(y) + 0.5) / f64::from(h) * 2.0 - 1.0;
            let d = (dx * dx + dy * dy).sqrt() / std::f64::consts::SQRT_2;
            let edge = ((d - 0.45) / 0.55).clamp(0.0, 1.0);
            let alpha = edge * edge * VIGNETTE_STRENGTH;
            let c = Rgba8::rgb(0, 0, 0).with_opacity(alpha).premultiplied();
            bytes.extend_from_slice(&c.to_array());
        }
    }
    let pixmap = cpu::pixmap_from_premul_bytes(&bytes, w, h)?;
    Ok(cpu::image_paint(Arc::new(pixmap)))
}

fn unit_hash(seed: u64, i: u64) -> f64 {
    let h = xxhash_rust::xxh3::xxh3_64_with_seed(&i.to_le_bytes(), seed);
    (h >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
#[path = "../../tests/unit/render/environment.rs"]
mod tests;
