use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{Affine, Point, Rgba8, Size, Vec2};
use crate::foundation::error::{RevealError, RevealResult};
use crate::raster::cpu;

/// Fonts tried by [`TextRenderer::discover`] when no font path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Layouts kept before the cache is flushed.
const MAX_CACHED_LAYOUTS: usize = 128;

/// RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Horizontal placement of each line inside the wrap width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Start,
    /// Centered.
    Center,
}

/// Size, color and wrapping for one text run. Sizes are in virtual canvas units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size.
    pub size: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Wrap width; `None` lays out a single line.
    pub max_width: Option<f32>,
    /// Line alignment within `max_width`.
    pub align: TextAlign,
}

impl TextStyle {
    /// Single-line, left-aligned style.
    pub fn new(size: f32, color: Rgba8) -> Self {
        Self {
            size,
            color,
            max_width: None,
            align: TextAlign::Start,
        }
    }

    /// Wrap at `width`.
    pub fn wrapped(mut self, width: f32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Center lines.
    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    size_bits: u32,
    width_bits: Option<u32>,
    color: [u8; 4],
}

struct LoadedFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Shapes, wraps and draws text with one registered font.
///
/// Without a font every draw is skipped and measurements return `None`, so frames still render
/// on machines that have no usable font.
pub struct TextRenderer {
    font: Option<LoadedFont>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    cache: HashMap<LayoutKey, Arc<parley::Layout<TextBrush>>>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("font", &self.font.as_ref().map(|f| f.family.as_str()))
            .field("cached_layouts", &self.cache.len())
            .finish()
    }
}

impl TextRenderer {
    /// Renderer without a font.
    pub fn new() -> Self {
        Self {
            font: None,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            cache: HashMap::new(),
        }
    }

    /// Renderer using the font in `bytes` (TTF/OTF).
    pub fn with_font_bytes(bytes: Vec<u8>) -> RevealResult<Self> {
        let mut out = Self::new();
        let families = out
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| RevealError::validation("no font families registered from font bytes"))?;
        let family = out
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RevealError::validation("registered font family has no name"))?
            .to_string();
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        out.font = Some(LoadedFont { family, data });
        Ok(out)
    }

    /// Renderer using the font file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> RevealResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::with_font_bytes(bytes)
    }

    /// Use `preferred` if given, else the first usable system font, else no font.
    pub fn discover(preferred: Option<&Path>) -> Self {
        if let Some(path) = preferred {
            match Self::from_path(path) {
                Ok(r) => return r,
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "configured font unusable"),
            }
        }
        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if path.is_file()
                && let Ok(r) = Self::from_path(path)
            {
                tracing::debug!(font = candidate, "using system font");
                return r;
            }
        }
        tracing::warn!("no font found, text overlays will be skipped");
        Self::new()
    }

    /// Whether a font is loaded.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Drop every cached layout.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached layouts.
    pub fn cached_layouts(&self) -> usize {
        self.cache.len()
    }

    fn layout(&mut self, text: &str, style: &TextStyle) -> Option<Arc<parley::Layout<TextBrush>>> {
        let font = self.font.as_ref()?;
        if text.is_empty() || !style.size.is_finite() || style.size <= 0.0 {
            return None;
        }
        let key = LayoutKey {
            text: text.to_owned(),
            size_bits: style.size.to_bits(),
            width_bits: style.max_width.map(f32::to_bits),
            color: [style.color.r, style.color.g, style.color.b, style.color.a],
        };
        if let Some(layout) = self.cache.get(&key) {
            return Some(layout.clone());
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush::from(
            style.color,
        )));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(style.max_width);
        layout.align(
            style.max_width,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        if self.cache.len() >= MAX_CACHED_LAYOUTS {
            self.cache.clear();
        }
        let layout = Arc::new(layout);
        self.cache.insert(key, layout.clone());
        Some(layout)
    }

    /// Laid-out size of `text`, or `None` without a font.
    pub fn measure(&mut self, text: &str, style: &TextStyle) -> Option<Size> {
        let layout = self.layout(text, style)?;
        Some(Size::new(f64::from(layout.width()), f64::from(layout.height())))
    }

    /// Number of wrapped lines, or `None` without a font.
    pub fn line_count(&mut self, text: &str, style: &TextStyle) -> Option<usize> {
        Some(self.layout(text, style)?.len())
    }

    /// Draw `text` with its layout box's top-left at `origin` under `transform`.
    ///
    /// Returns the laid-out size, or `None` if nothing was drawn.
    pub(crate) fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        transform: Affine,
        origin: Point,
        text: &str,
        style: &TextStyle,
        opacity: f64,
    ) -> Option<Size> {
        let layout = self.layout(text, style)?;
        let font = &self.font.as_ref()?.data;
        let box_width = style.max_width.unwrap_or_else(|| layout.width());
        for line in layout.lines() {
            let dx = match style.align {
                TextAlign::Start => 0.0,
                TextAlign::Center => f64::from((box_width - line.metrics().advance).max(0.0) / 2.0),
            };
            ctx.set_transform(cpu::affine_to_cpu(
                transform * Affine::translate(origin.to_vec2() + Vec2::new(dx, 0.0)),
            ));
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                let color = Rgba8::rgba(brush.r, brush.g, brush.b, brush.a).with_opacity(opacity);
                ctx.set_paint(cpu::color_to_cpu(color));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Some(Size::new(
            f64::from(box_width),
            f64::from(layout.height()),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
