use super::*;

fn image(rgb: [u8; 3]) -> SourceImage {
    let px: Vec<u8> = (0..9 * 19).flat_map(|_| [rgb[0], rgb[1], rgb[2], 255]).collect();
    SourceImage::from_rgba8(9, 19, px).unwrap()
}

fn render(env: &mut EnvironmentRenderer, img: Option<&SourceImage>, elapsed: f64) -> Vec<u8> {
    let (w, h) = (54u16, 114u16);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    env.render(&mut ctx, Affine::scale(0.05), img, elapsed);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap.data_as_u8_slice().to_vec()
}

#[test]
fn backdrop_covers_every_pixel() {
    let mut env = EnvironmentRenderer::new(1);
    let out = render(&mut env, None, 0.0);
    // Translucent dust and vignette layers may round alpha down by one in the u8 pipeline.
    assert!(out.chunks_exact(4).all(|px| px[3] >= 254));
}

#[test]
fn image_tints_the_backdrop_darker_than_source() {
    let mut env = EnvironmentRenderer::new(1);
    let out = render(&mut env, Some(&image([250, 20, 20])), 0.0);
    let center = ((57 * 54 + 27) * 4) as usize;
    let px = &out[center..center + 4];
    assert!(px[0] > px[1] + 40, "{px:?}");
    assert!(px[0] < 200, "{px:?}");
}

#[test]
fn backdrop_is_cached_per_image_token() {
    let mut env = EnvironmentRenderer::new(1);
    let red = image([200, 0, 0]);
    render(&mut env, Some(&red), 0.0);
    let first = env.backdrop.as_ref().map(|b| b.token);
    render(&mut env, Some(&red), 500.0);
    assert_eq!(env.backdrop.as_ref().map(|b| b.token), first);
    let blue = image([0, 0, 200]);
    render(&mut env, Some(&blue), 0.0);
    assert_eq!(env.backdrop.as_ref().map(|b| b.token), Some(blue.token()));
    env.reset();
    assert!(env.backdrop.is_none());
}

#[test]
fn dust_field_is_fixed_and_wraps() {
    let env = EnvironmentRenderer::new(42);
    assert_eq!(env.dust_count(), DUST_COUNT);
    assert_eq!(EnvironmentRenderer::new(42).dust, env.dust);
    for d in &env.dust {
        for t in [0.0, 10_000.0, 1e7] {
            let (_, y) = d.position(t);
            assert!((-DUST_MARGIN..=VIRTUAL_HEIGHT + DUST_MARGIN).contains(&y));
        }
    }
}

#[test]
fn grading_darkens_and_keeps_premultiplied_invariant() {
    let mut px = [200u8, 100, 50, 220];
    grade_pixel(&mut px);
    assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
    assert!(px[0] < 200);
    assert_eq!(px[3], 220);
}

#[test]
fn dust_motes_are_round() {
    let mut env = EnvironmentRenderer::new(3);
    env.dust = vec![Dust {
        x: 20.0,
        y: 20.0 + DUST_MARGIN,
        radius: 15.0,
        rise_per_ms: 0.0,
        drift: 0.0,
        phase: 0.0,
        alpha: 1.0,
    }];
    let mut ctx = vello_cpu::RenderContext::new(40, 40);
    env.render_dust(&mut ctx, Affine::IDENTITY, 0.0);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(40, 40);
    ctx.render_to_pixmap(&mut pixmap);
    let px = pixmap.data_as_u8_slice();
    let alpha = |x: usize, y: usize| px[(y * 40 + x) * 4 + 3];
    assert!(alpha(20, 20) > 150);
    // Inside the bounding square but outside the circle.
    assert_eq!(alpha(7, 7), 0);
    assert_eq!(alpha(32, 32), 0);
}
