use super::*;

fn story() -> StoryArc {
    StoryArc {
        hook: "What is hiding here?".into(),
        buildup: vec!["First clue".into(), "Second clue".into(), "Third clue".into()],
        climax: "Almost there".into(),
        reveal: "It was a lighthouse".into(),
    }
}

#[test]
fn story_windows_select_beats() {
    let content = NarrativeContent {
        story: Some(story()),
        facts: Vec::new(),
    };
    assert!(content.caption_at(2.0).is_none());
    assert_eq!(content.caption_at(10.0).unwrap().phase, NarrativePhase::Hook);
    assert_eq!(content.caption_at(25.0).unwrap().text, "First clue");
    assert_eq!(content.caption_at(45.0).unwrap().phase, NarrativePhase::Buildup(1));
    assert_eq!(content.caption_at(65.0).unwrap().text, "Third clue");
    assert!(content.caption_at(75.0).is_none());
    assert_eq!(content.caption_at(88.0).unwrap().phase, NarrativePhase::Climax);
    assert_eq!(content.caption_at(100.0).unwrap().text, "It was a lighthouse");
}

#[test]
fn captions_fade_at_window_edges() {
    let content = NarrativeContent {
        story: Some(story()),
        facts: Vec::new(),
    };
    let entering = content.caption_at(5.0 + CAPTION_FADE / 2.0).unwrap();
    assert!((entering.alpha - 0.5).abs() < 1e-9);
    assert_eq!(content.caption_at(10.0).unwrap().alpha, 1.0);
    let leaving = content.caption_at(15.0 - CAPTION_FADE / 4.0).unwrap();
    assert!((leaving.alpha - 0.25).abs() < 1e-9);
    assert_eq!(content.caption_at(99.9).unwrap().alpha, 1.0);
}

#[test]
fn accents_follow_phase_colors() {
    assert_eq!(NarrativePhase::Hook.accent(), Rgba8::rgb(255, 184, 48));
    assert_ne!(NarrativePhase::Buildup(0).accent(), NarrativePhase::Climax.accent());
    assert_eq!(NarrativePhase::Buildup(2).label(), NarrativePhase::Buildup(0).label());
}

#[test]
fn fallback_facts_without_story() {
    let content = NarrativeContent::default();
    let first = content.caption_at(FACT_THRESHOLDS[0] + 2.0).unwrap();
    assert_eq!(first.phase, NarrativePhase::Fact);
    assert_eq!(first.text, DEFAULT_FACTS[0]);
    assert!(content.caption_at(FACT_THRESHOLDS[0] + FACT_SPAN + 1.0).is_none());

    let custom = NarrativeContent {
        story: None,
        facts: vec!["Only one fact".into()],
    };
    assert_eq!(custom.caption_at(FACT_THRESHOLDS[0] + 1.0).unwrap().text, "Only one fact");
    assert!(custom.caption_at(FACT_THRESHOLDS[1] + 1.0).is_none());
}

#[test]
fn blank_text_and_nan_progress_show_nothing() {
    let mut s = story();
    s.hook = "   ".into();
    let content = NarrativeContent {
        story: Some(s),
        facts: Vec::new(),
    };
    assert!(content.caption_at(10.0).is_none());
    assert!(content.caption_at(f64::NAN).is_none());
}

#[test]
fn render_without_font_draws_nothing() {
    let mut text = TextRenderer::new();
    let mut ctx = vello_cpu::RenderContext::new(54, 114);
    let caption = Caption {
        phase: NarrativePhase::Hook,
        text: "hello".into(),
        alpha: 1.0,
    };
    render_caption(&mut ctx, Affine::scale(0.05), &mut text, &caption);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(54, 114);
    ctx.render_to_pixmap(&mut pixmap);
    assert!(pixmap.data_as_u8_slice().iter().all(|&b| b == 0));
}
