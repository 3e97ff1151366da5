use super::*;
use crate::foundation::core::{Point, Rect, Size};

fn moving(x: f64) -> MotionTransform {
    MotionTransform {
        x,
        y: 100.0,
        rotation: 0.0,
        scale: 1.0,
        stretch: 1.0,
    }
}

fn piece_with_bitmap() -> Piece {
    let bytes = vec![200u8; 10 * 10 * 4];
    let bitmap =
        PieceBitmap::from_premul(&bytes, 10, 10, Rect::new(-2.0, -2.0, 18.0, 18.0), 0.5).unwrap();
    Piece {
        id: 4,
        source_rect: Rect::ZERO,
        target: Point::new(100.0, 100.0),
        start: Point::ZERO,
        size: Size::new(16.0, 16.0),
        rotation: 0.0,
        z_order: 0.0,
        assembly_order: 0,
        shape_sub_index: 0,
        connections: None,
        grid_x: 0,
        grid_y: 0,
        sector_index: 0,
        bitmap: Some(bitmap),
        wave_delay: 0.0,
    }
}

#[test]
fn every_profile_has_a_distinct_style_within_spacing_bounds() {
    for (i, a) in MotionProfile::ALL.iter().enumerate() {
        let s = TrailStyle::for_profile(*a);
        assert!((75.0..=100.0).contains(&s.spacing_ms));
        assert!((2..=3).contains(&s.max_len));
        for b in &MotionProfile::ALL[i + 1..] {
            assert_ne!(s, TrailStyle::for_profile(*b));
        }
    }
}

#[test]
fn samples_respect_window_and_spacing() {
    let mut trails = TrailTracker::new();
    let p = MotionProfile::Flight;
    assert!(!trails.update(1, &moving(0.0), 0.0, p, 0.05));
    assert!(!trails.update(1, &moving(0.0), 0.0, p, 0.9));
    assert!(trails.is_empty());

    assert!(trails.update(1, &moving(0.0), 1000.0, p, 0.3));
    assert!(!trails.update(1, &moving(1.0), 1010.0, p, 0.31));
    assert!(trails.update(1, &moving(2.0), 1080.0, p, 0.32));
    assert_eq!(trails.samples(1).len(), 2);
}

#[test]
fn history_is_bounded_and_keeps_newest() {
    let mut trails = TrailTracker::new();
    let p = MotionProfile::Vortex;
    let max = TrailStyle::for_profile(p).max_len;
    for i in 0..10 {
        trails.update(7, &moving(f64::from(i)), f64::from(i) * 200.0, p, 0.5);
    }
    let samples = trails.samples(7);
    assert_eq!(samples.len(), max);
    assert_eq!(samples.last().unwrap().transform.x, 9.0);
    assert!(samples.windows(2).all(|w| w[0].t_ms < w[1].t_ms));
}

#[test]
fn seeking_backwards_restarts_history() {
    let mut trails = TrailTracker::new();
    let p = MotionProfile::Standard;
    trails.update(2, &moving(0.0), 5000.0, p, 0.5);
    trails.update(2, &moving(1.0), 5200.0, p, 0.5);
    assert!(trails.update(2, &moving(2.0), 100.0, p, 0.5));
    assert_eq!(trails.samples(2).len(), 1);
}

#[test]
fn clear_and_reset_evict() {
    let mut trails = TrailTracker::new();
    trails.update(1, &moving(0.0), 0.0, MotionProfile::Wave, 0.5);
    trails.update(2, &moving(0.0), 0.0, MotionProfile::Wave, 0.5);
    trails.clear(1);
    assert!(trails.samples(1).is_empty());
    assert_eq!(trails.len(), 1);
    trails.reset();
    assert!(trails.is_empty());
}

#[test]
fn render_builds_ghost_once_and_draws() {
    let mut trails = TrailTracker::new();
    let piece = piece_with_bitmap();
    let p = MotionProfile::Playful;
    trails.update(piece.id, &moving(20.0), 0.0, p, 0.5);
    trails.update(piece.id, &moving(30.0), 200.0, p, 0.5);

    let mut ctx = vello_cpu::RenderContext::new(64, 64);
    trails.render(&mut ctx, Affine::scale(0.5), &piece, p, 0.5);
    assert_eq!(trails.ghosts.len(), 1);
    trails.render(&mut ctx, Affine::scale(0.5), &piece, p, 0.5);
    assert_eq!(trails.ghosts.len(), 1);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(64, 64);
    ctx.render_to_pixmap(&mut pixmap);
    assert!(pixmap.data_as_u8_slice().chunks_exact(4).any(|px| px[3] > 0));

    trails.clear(piece.id);
    assert!(trails.ghosts.is_empty());
}

#[test]
fn ghost_tint_keeps_premultiplied_range() {
    let bytes: Vec<u8> = (0..16).flat_map(|i| [i * 10, 0, 0, i * 12]).collect();
    let bitmap = PieceBitmap::from_premul(&bytes, 4, 4, Rect::new(0.0, 0.0, 4.0, 4.0), 1.0);
    let bitmap = bitmap.unwrap();
    let style = TrailStyle::for_profile(MotionProfile::Flight);
    let ghost = ghost_bitmap(&bitmap, &style).unwrap();
    for px in ghost.premul_rgba8().chunks_exact(4) {
        assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3], "{px:?}");
    }
}
