use std::f64::consts::TAU;
use std::path::PathBuf;

use kurbo::{Circle, RoundedRect, Shape};

use crate::foundation::core::{
    Affine, Point, Rect, Rgba8, VIRTUAL_HEIGHT, VIRTUAL_WIDTH, Vec2,
};
use crate::raster::cpu;
use crate::raster::image::SourceImage;
use crate::render::text::{TextRenderer, TextStyle};

/// Channel identity shown on the closing card.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChannelBranding {
    /// Display name; its initials stand in for a missing avatar.
    pub name: String,
    /// Handle printed under the headline.
    pub handle: String,
    /// Optional avatar image file.
    pub avatar_path: Option<PathBuf>,
    /// Big line of the card.
    pub headline: String,
    /// Smaller line under it.
    pub subtitle: String,
}

impl Default for ChannelBranding {
    fn default() -> Self {
        Self {
            name: "Puzzle Reveal".to_owned(),
            handle: "@puzzlereveal".to_owned(),
            avatar_path: None,
            headline: "Thanks for watching!".to_owned(),
            subtitle: "A new picture is cut every day".to_owned(),
        }
    }
}

/// Up to two uppercase initials of `name`, or `?`.
pub fn initials(name: &str) -> String {
    let out: String = name
        .split_whitespace()
        .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if out.is_empty() { "?".to_owned() } else { out }
}

/// Action buttons along the bottom of the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pill {
    /// Heart, beating.
    Like,
    /// Speech bubble, breathing.
    Comment,
    /// Subscribe, pulsing glow.
    Subscribe,
}

impl Pill {
    /// Left to right.
    pub const ALL: [Self; 3] = [Self::Like, Self::Comment, Self::Subscribe];

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::Like => "Like",
            Self::Comment => "Comment",
            Self::Subscribe => "Subscribe",
        }
    }

    fn fill(self) -> Rgba8 {
        match self {
            Self::Like => Rgba8::rgb(255, 72, 102),
            Self::Comment => Rgba8::rgb(72, 156, 255),
            Self::Subscribe => Rgba8::rgb(230, 33, 23),
        }
    }

    /// Scale of the button `t_ms` after the card appeared.
    pub fn pulse(self, t_ms: f64) -> f64 {
        let t = t_ms.max(0.0);
        match self {
            Self::Like => {
                let phase = (t / HEARTBEAT_PERIOD_MS).fract();
                let beat = |at: f64| (-((phase - at) / 0.05).powi(2)).exp();
                1.0 + 0.09 * (beat(0.0) + beat(1.0) + 0.6 * beat(0.2))
            }
            Self::Comment => 1.0 + 0.04 * (t / 1600.0 * TAU).sin(),
            Self::Subscribe => 1.0 + 0.06 * (t / 1000.0 * TAU).sin().max(0.0),
        }
    }
}

const HEARTBEAT_PERIOD_MS: f64 = 1200.0;

const PANEL_SIZE: (f64, f64) = (880.0, 1100.0);
const PANEL_RADIUS: f64 = 56.0;
const PANEL_RISE: f64 = 60.0;
const AVATAR_RADIUS: f64 = 130.0;
const AVATAR_TOP: f64 = 90.0;
const HEADLINE_GAP: f64 = 70.0;
const LINE_GAP: f64 = 24.0;
const PILL_SIZE: (f64, f64) = (250.0, 100.0);
const PILL_GAP: f64 = 25.0;
const PILL_BOTTOM: f64 = 90.0;

/// Draws the closing card.
pub struct OutroRenderer {
    branding: ChannelBranding,
    avatar: Option<SourceImage>,
}

impl std::fmt::Debug for OutroRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutroRenderer")
            .field("branding", &self.branding)
            .field("avatar", &self.avatar.is_some())
            .finish()
    }
}

impl OutroRenderer {
    /// Card for `branding`, loading its avatar if one is configured and readable.
    pub fn new(branding: ChannelBranding) -> Self {
        let avatar = branding
            .avatar_path
            .as_ref()
            .and_then(|p| match SourceImage::open(p) {
                Ok(img) => Some(img),
                Err(err) => {
                    tracing::warn!(
                        path = %p.display(),
                        error = %err,
                        "avatar unusable, using initials"
                    );
                    None
                }
            });
        Self { branding, avatar }
    }

    /// Replace the avatar image.
    pub fn with_avatar(mut self, avatar: SourceImage) -> Self {
        self.avatar = Some(avatar);
        self
    }

    /// Branding shown.
    pub fn branding(&self) -> &ChannelBranding {
        &self.branding
    }

    /// Whether an avatar image is available.
    pub fn has_avatar(&self) -> bool {
        self.avatar.is_some()
    }

    /// Card rectangle at opacity `alpha`; it rises into place while fading in.
    pub fn panel_rect(alpha: f64) -> Rect {
        let (w, h) = PANEL_SIZE;
        let x0 = (VIRTUAL_WIDTH - w) / 2.0;
        let y0 = (VIRTUAL_HEIGHT - h) / 2.0 + (1.0 - alpha.clamp(0.0, 1.0)) * PANEL_RISE;
        Rect::new(x0, y0, x0 + w, y0 + h)
    }

    /// Draw the card `t_ms` after it started, at opacity `alpha`.
    pub(crate) fn render(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        base: Affine,
        text: &mut TextRenderer,
        t_ms: f64,
        alpha: f64,
    ) {
        if alpha.is_nan() || alpha <= 0.0 {
            return;
        }
        let panel = Self::panel_rect(alpha);
        ctx.set_transform(cpu::affine_to_cpu(base));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu::color_to_cpu(Rgba8::rgba(18, 20, 30, 200).with_opacity(alpha)));
        let shape = RoundedRect::from_rect(panel, PANEL_RADIUS).to_path(0.1);
        ctx.fill_path(&cpu::bezpath_to_cpu(&shape));
        ctx.set_paint(cpu::color_to_cpu(Rgba8::rgba(255, 255, 255, 50).with_opacity(alpha)));
        let border = kurbo::stroke(
            shape.iter(),
            &kurbo::Stroke::new(3.0),
            &kurbo::StrokeOpts::default(),
            0.1,
        );
        ctx.fill_path(&cpu::bezpath_to_cpu(&border));

        let avatar_center = Point::new(panel.center().x, panel.y0 + AVATAR_TOP + AVATAR_RADIUS);
        self.render_avatar(ctx, base, text, avatar_center, alpha);

        let inner_w = (PANEL_SIZE.0 - 120.0) as f32;
        let mut y = avatar_center.y + AVATAR_RADIUS + HEADLINE_GAP;
        for (line, size, color) in [
            (&self.branding.headline, 64.0, Rgba8::rgb(255, 255, 255)),
            (&self.branding.subtitle, 40.0, Rgba8::rgb(200, 204, 220)),
            (&self.branding.handle, 36.0, Rgba8::rgb(255, 200, 80)),
        ] {
            let style = TextStyle::new(size, color).wrapped(inner_w).centered();
            let origin = Point::new(panel.x0 + 60.0, y);
            if let Some(drawn) = text.draw(ctx, base, origin, line, &style, alpha) {
                y += drawn.height + LINE_GAP;
            }
        }

        let (pw, ph) = PILL_SIZE;
        let row_w = pw * 3.0 + PILL_GAP * 2.0;
        let pill_y = panel.y1 - PILL_BOTTOM - ph / 2.0;
        for (i, pill) in Pill::ALL.into_iter().enumerate() {
            let cx = panel.center().x - row_w / 2.0 + pw / 2.0 + i as f64 * (pw + PILL_GAP);
            let s = pill.pulse(t_ms);
            let local = base * Affine::translate(Vec2::new(cx, pill_y)) * Affine::scale(s);
            ctx.set_transform(cpu::affine_to_cpu(local));
            ctx.set_paint(cpu::color_to_cpu(pill.fill().with_opacity(alpha)));
            let rect = Rect::new(-pw / 2.0, -ph / 2.0, pw / 2.0, ph / 2.0);
            let body = RoundedRect::from_rect(rect, ph / 2.0).to_path(0.1);
            ctx.fill_path(&cpu::bezpath_to_cpu(&body));
            let style = TextStyle::new(36.0, Rgba8::rgb(255, 255, 255))
                .wrapped(pw as f32)
                .centered();
            if let Some(size) = text.measure(pill.label(), &style) {
                let origin = Point::new(-pw / 2.0, -size.height / 2.0);
                text.draw(ctx, local, origin, pill.label(), &style, alpha);
            }
        }
    }

    fn render_avatar(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        base: Affine,
        text: &mut TextRenderer,
        center: Point,
        alpha: f64,
    ) {
        let circle = Circle::new(center, AVATAR_RADIUS).to_path(0.1);
        ctx.set_transform(cpu::affine_to_cpu(base));
        match &self.avatar {
            Some(img) => {
                let side = f64::from(img.width().min(img.height()));
                let scale = AVATAR_RADIUS * 2.0 / side;
                let offset = Vec2::new(
                    center.x - f64::from(img.width()) * scale / 2.0,
                    center.y - f64::from(img.height()) * scale / 2.0,
                );
                ctx.set_paint_transform(cpu::affine_to_cpu(
                    Affine::translate(offset) * Affine::scale(scale),
                ));
                ctx.set_paint(img.paint());
                if alpha < 1.0 {
                    ctx.push_opacity_layer(alpha as f32);
                }
                ctx.fill_path(&cpu::bezpath_to_cpu(&circle));
                if alpha < 1.0 {
                    ctx.pop_layer();
                }
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            }
            None => {
                ctx.set_paint(cpu::color_to_cpu(Rgba8::rgb(96, 72, 220).with_opacity(alpha)));
                ctx.fill_path(&cpu::bezpath_to_cpu(&circle));
                let label = initials(&self.branding.name);
                let style = TextStyle::new(110.0, Rgba8::rgb(255, 255, 255))
                    .wrapped((AVATAR_RADIUS * 2.0) as f32)
                    .centered();
                if let Some(size) = text.measure(&label, &style) {
                    let origin = Point::new(
                        center.x - AVATAR_RADIUS,
                        center.y - size.height / 2.0,
                    );
                    text.draw(ctx, base, origin, &label, &style, alpha);
                }
            }
        }
        let ring = kurbo::stroke(
            circle.iter(),
            &kurbo::Stroke::new(6.0),
            &kurbo::StrokeOpts::default(),
            0.1,
        );
        ctx.set_transform(cpu::affine_to_cpu(base));
        ctx.set_paint(cpu::color_to_cpu(Rgba8::rgb(255, 255, 255).with_opacity(alpha * 0.8)));
        ctx.fill_path(&cpu::bezpath_to_cpu(&ring));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/outro.rs"]
mod tests;
