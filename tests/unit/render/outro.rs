use super::*;

#[test]
fn initials_take_first_two_words() {
    assert_eq!(initials("Puzzle Reveal Daily"), "PR");
    assert_eq!(initials("  zen  "), "Z");
    assert_eq!(initials("@@@ !!!"), "?");
    assert_eq!(initials(""), "?");
}

#[test]
fn like_pill_beats_twice_per_period() {
    let peak = Pill::Like.pulse(0.0);
    let rest = Pill::Like.pulse(HEARTBEAT_PERIOD_MS * 0.5);
    let second = Pill::Like.pulse(HEARTBEAT_PERIOD_MS * 0.2);
    assert!(peak > second && second > rest, "{peak} {second} {rest}");
    assert!((rest - 1.0).abs() < 1e-3);
    assert!((Pill::Like.pulse(HEARTBEAT_PERIOD_MS) - peak).abs() < 1e-9);
}

#[test]
fn pulses_stay_near_unit_scale() {
    for pill in Pill::ALL {
        for i in 0..200 {
            let s = pill.pulse(f64::from(i) * 37.0);
            assert!((0.9..=1.2).contains(&s), "{pill:?} {s}");
        }
    }
}

#[test]
fn panel_rises_while_fading_in() {
    let hidden = OutroRenderer::panel_rect(0.0);
    let shown = OutroRenderer::panel_rect(1.0);
    assert!((hidden.y0 - shown.y0 - PANEL_RISE).abs() < 1e-9);
    assert!((shown.center().x - VIRTUAL_WIDTH / 2.0).abs() < 1e-9);
    assert!((shown.center().y - VIRTUAL_HEIGHT / 2.0).abs() < 1e-9);
}

#[test]
fn missing_avatar_falls_back_to_initials() {
    let branding = ChannelBranding {
        avatar_path: Some("/no/such/avatar.png".into()),
        ..ChannelBranding::default()
    };
    let outro = OutroRenderer::new(branding);
    assert!(!outro.has_avatar());
}

#[test]
fn render_draws_panel_with_and_without_avatar() {
    let avatar = SourceImage::from_rgba8(2, 2, vec![255; 16]).unwrap();
    for outro in [
        OutroRenderer::new(ChannelBranding::default()),
        OutroRenderer::new(ChannelBranding::default()).with_avatar(avatar.clone()),
    ] {
        let mut ctx = vello_cpu::RenderContext::new(54, 114);
        let mut text = TextRenderer::new();
        outro.render(&mut ctx, Affine::scale(0.05), &mut text, 500.0, 1.0);
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(54, 114);
        ctx.render_to_pixmap(&mut pixmap);
        let center = ((57 * 54 + 27) * 4) as usize;
        assert!(pixmap.data_as_u8_slice()[center + 3] > 0);
    }
}

#[test]
fn zero_alpha_draws_nothing() {
    let outro = OutroRenderer::new(ChannelBranding::default());
    let mut ctx = vello_cpu::RenderContext::new(54, 114);
    outro.render(&mut ctx, Affine::scale(0.05), &mut TextRenderer::new(), 0.0, 0.0);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(54, 114);
    ctx.render_to_pixmap(&mut pixmap);
    assert!(pixmap.data_as_u8_slice().iter().all(|&b| b == 0));
}
