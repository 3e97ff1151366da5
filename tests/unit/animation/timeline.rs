use super::*;

#[test]
fn first_piece_starts_immediately_and_every_piece_lands_by_total() {
    let tl = AssemblyTimeline::new(60_000.0, PIECE_ANIM_MS, 100);
    assert_eq!(tl.delay(0), 0.0);
    assert_eq!(tl.progress(0, 0.0), 0.0);
    assert_eq!(tl.progress(0, PIECE_ANIM_MS), 1.0);
    let last = tl.delay(99);
    assert_eq!(last, 99.0 / 100.0 * (60_000.0 - PIECE_ANIM_MS));
    assert!(tl.progress(99, last + PIECE_ANIM_MS - 1.0) < 1.0);
    assert!(tl.progress(99, last + PIECE_ANIM_MS) > 1.0 - 1e-9);
    assert_eq!(tl.completion_percent(0..100u32, 60_000.0), 100.0);
}

#[test]
fn completion_is_monotonic_in_elapsed() {
    let tl = AssemblyTimeline::new(60_000.0, PIECE_ANIM_MS, 250);
    let mut last = 0.0;
    for step in 0..=700 {
        let pct = tl.completion_percent(0..250u32, f64::from(step) * 100.0);
        assert!(pct >= last);
        last = pct;
    }
    assert_eq!(last, 100.0);
}

#[test]
fn half_time_completes_roughly_half() {
    let tl = AssemblyTimeline::new(60_000.0, PIECE_ANIM_MS, 1000);
    let pct = tl.completion_percent(0..1000u32, 30_000.0);
    assert!((40.0..=55.0).contains(&pct), "{pct}");
}

#[test]
fn negative_elapsed_and_empty_sets_are_trivial() {
    let tl = AssemblyTimeline::new(10_000.0, 1000.0, 0);
    assert_eq!(tl.completion_percent(std::iter::empty(), 5000.0), 0.0);
    let tl = AssemblyTimeline::new(10_000.0, 1000.0, 10);
    assert_eq!(tl.progress(3, -500.0), 0.0);
    assert_eq!(tl.time_percent(-1.0), 0.0);
    assert_eq!(tl.time_percent(20_000.0), 100.0);
}

#[test]
fn zero_anim_duration_snaps() {
    let tl = AssemblyTimeline::new(1000.0, 0.0, 2);
    assert_eq!(tl.progress(1, 499.0), 0.0);
    assert_eq!(tl.progress(1, 500.0), 1.0);
}
