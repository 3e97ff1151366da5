//! Caption panel shown in the lower third while pieces assemble.
//!
//! The caption is chosen from the time progress of the reveal. A story arc fills five windows
//! (hook, three buildup beats, climax, reveal); without one, plain fact snippets appear at fixed
//! thresholds.

use kurbo::{RoundedRect, Shape};

use crate::foundation::core::{Affine, Point, Rect, Rgba8, VIRTUAL_HEIGHT, VIRTUAL_WIDTH};
use crate::foundation::math::clamp01;
use crate::raster::cpu;
use crate::render::text::{TextRenderer, TextStyle};
use crate::services::content::StoryArc;

/// Beat of a story arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativePhase {
    /// Opening question.
    Hook,
    /// One of three buildup beats (0, 1 or 2).
    Buildup(u8),
    /// Tension peak.
    Climax,
    /// Final answer.
    Reveal,
    /// Plain fact snippet.
    Fact,
}

impl NarrativePhase {
    /// Label above the caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hook => "THE HOOK",
            Self::Buildup(_) => "BUILDING UP",
            Self::Climax => "THE CLIMAX",
            Self::Reveal => "THE REVEAL",
            Self::Fact => "DID YOU KNOW",
        }
    }

    /// Accent color of the label and panel bar.
    pub fn accent(self) -> Rgba8 {
        match self {
            Self::Hook => Rgba8::rgb(255, 184, 48),
            Self::Buildup(_) => Rgba8::rgb(72, 156, 255),
            Self::Climax => Rgba8::rgb(176, 96, 255),
            Self::Reveal => Rgba8::rgb(64, 214, 120),
            Self::Fact => Rgba8::rgb(230, 230, 230),
        }
    }
}

/// Story windows in percent of assembly time; the reveal runs to the end.
pub const STORY_WINDOWS: [(NarrativePhase, f64, f64); 6] = [
    (NarrativePhase::Hook, 5.0, 15.0),
    (NarrativePhase::Buildup(0), 20.0, 30.0),
    (NarrativePhase::Buildup(1), 40.0, 50.0),
    (NarrativePhase::Buildup(2), 60.0, 70.0),
    (NarrativePhase::Climax, 85.0, 92.0),
    (NarrativePhase::Reveal, 95.0, f64::INFINITY),
];

/// Percent thresholds at which fallback facts appear.
pub const FACT_THRESHOLDS: [f64; 4] = [8.0, 32.0, 56.0, 80.0];
/// How long a fallback fact stays up, in percent.
pub const FACT_SPAN: f64 = 12.0;

/// Facts used when neither a story nor configured facts exist.
pub const DEFAULT_FACTS: [&str; 4] = [
    "Every piece you see was cut from the same image.",
    "The first jigsaw puzzles were hand-cut maps used to teach geography.",
    "No two pieces share the same edge pattern.",
    "Watch closely: the last pieces land right before the reveal.",
];

/// Fade in/out width at the window edges, in percent.
const CAPTION_FADE: f64 = 1.5;

/// Caption to show at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Caption {
    /// Story beat or fact.
    pub phase: NarrativePhase,
    /// Body text.
    pub text: String,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
}

/// What the overlay can say.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NarrativeContent {
    /// Structured story, if one was generated.
    pub story: Option<StoryArc>,
    /// Fallback snippets; [`DEFAULT_FACTS`] when empty.
    pub facts: Vec<String>,
}

impl NarrativeContent {
    /// Caption at `progress_percent` of assembly time, if any window is open.
    pub fn caption_at(&self, progress_percent: f64) -> Option<Caption> {
        if !progress_percent.is_finite() {
            return None;
        }
        match &self.story {
            Some(story) => STORY_WINDOWS.iter().find_map(|&(phase, start, end)| {
                let text = match phase {
                    NarrativePhase::Hook => &story.hook,
                    NarrativePhase::Buildup(i) => story.buildup.get(usize::from(i))?,
                    NarrativePhase::Climax => &story.climax,
                    NarrativePhase::Reveal => &story.reveal,
                    NarrativePhase::Fact => return None,
                };
                window_caption(phase, text, progress_percent, start, end)
            }),
            None => FACT_THRESHOLDS.iter().enumerate().find_map(|(i, &start)| {
                let text = match self.facts.get(i) {
                    Some(f) => f.as_str(),
                    None if self.facts.is_empty() => DEFAULT_FACTS[i],
                    None => return None,
                };
                let end = start + FACT_SPAN;
                window_caption(NarrativePhase::Fact, text, progress_percent, start, end)
            }),
        }
    }
}

fn window_caption(
    phase: NarrativePhase,
    text: &str,
    p: f64,
    start: f64,
    end: f64,
) -> Option<Caption> {
    if p < start || p >= end || text.trim().is_empty() {
        return None;
    }
    let fade_in = clamp01((p - start) / CAPTION_FADE);
    let fade_out = if end.is_finite() {
        clamp01((end - p) / CAPTION_FADE)
    } else {
        1.0
    };
    Some(Caption {
        phase,
        text: text.to_owned(),
        alpha: fade_in.min(fade_out),
    })
}

const PANEL_MARGIN_X: f64 = 60.0;
const PANEL_TOP: f64 = VIRTUAL_HEIGHT * 0.68;
const PANEL_PADDING: f64 = 44.0;
const PANEL_RADIUS: f64 = 36.0;
const LABEL_SIZE: f32 = 34.0;
const BODY_SIZE: f32 = 50.0;
const LABEL_GAP: f64 = 18.0;
const ACCENT_BAR: f64 = 10.0;

/// Draw `caption` as a glass panel. Skipped when no font is loaded.
pub(crate) fn render_caption(
    ctx: &mut vello_cpu::RenderContext,
    base: Affine,
    text: &mut TextRenderer,
    caption: &Caption,
) {
    if caption.alpha <= 0.0 || !text.has_font() {
        return;
    }
    let inner_w = (VIRTUAL_WIDTH - 2.0 * (PANEL_MARGIN_X + PANEL_PADDING)) as f32;
    let label_style = TextStyle::new(LABEL_SIZE, caption.phase.accent());
    let body_style = TextStyle::new(BODY_SIZE, Rgba8::rgb(255, 255, 255)).wrapped(inner_w);
    let Some(label) = text.measure(caption.phase.label(), &label_style) else {
        return;
    };
    let Some(body) = text.measure(&caption.text, &body_style) else {
        return;
    };

    let height = PANEL_PADDING * 2.0 + label.height + LABEL_GAP + body.height;
    let panel = Rect::new(
        PANEL_MARGIN_X,
        PANEL_TOP,
        VIRTUAL_WIDTH - PANEL_MARGIN_X,
        PANEL_TOP + height,
    );
    let a = caption.alpha;
    ctx.set_transform(cpu::affine_to_cpu(base));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(cpu::color_to_cpu(Rgba8::rgba(16, 18, 28, 170).with_opacity(a)));
    let shape = RoundedRect::from_rect(panel, PANEL_RADIUS).to_path(0.1);
    ctx.fill_path(&cpu::bezpath_to_cpu(&shape));
    ctx.set_paint(cpu::color_to_cpu(Rgba8::rgba(255, 255, 255, 40).with_opacity(a)));
    let border = kurbo::stroke(
        shape.iter(),
        &kurbo::Stroke::new(2.0),
        &kurbo::StrokeOpts::default(),
        0.1,
    );
    ctx.fill_path(&cpu::bezpath_to_cpu(&border));
    ctx.set_paint(cpu::color_to_cpu(caption.phase.accent().with_opacity(a)));
    let bar = RoundedRect::new(
        panel.x0 + PANEL_PADDING,
        panel.y0 + 18.0,
        panel.x0 + PANEL_PADDING + 90.0,
        panel.y0 + 18.0 + ACCENT_BAR,
        ACCENT_BAR / 2.0,
    );
    ctx.fill_path(&cpu::bezpath_to_cpu(&bar.to_path(0.1)));

    let label_origin = Point::new(panel.x0 + PANEL_PADDING, panel.y0 + PANEL_PADDING);
    text.draw(ctx, base, label_origin, caption.phase.label(), &label_style, a);
    let body_origin = Point::new(label_origin.x, label_origin.y + label.height + LABEL_GAP);
    text.draw(ctx, base, body_origin, &caption.text, &body_style, a);
}

#[cfg(test)]
#[path = "../../tests/unit/render/narrative.rs"]
mod tests;
