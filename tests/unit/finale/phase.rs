use super::*;
use crate::foundation::core::{Point, Rect, Size};

const TOTAL: f64 = 60_000.0;

fn piece(wave_delay: f64) -> Piece {
    Piece {
        id: 0,
        source_rect: Rect::ZERO,
        target: Point::ZERO,
        start: Point::ZERO,
        size: Size::new(10.0, 10.0),
        rotation: 0.0,
        z_order: 0.0,
        assembly_order: 0,
        shape_sub_index: 0,
        connections: None,
        grid_x: 0,
        grid_y: 0,
        sector_index: 0,
        bitmap: None,
        wave_delay,
    }
}

#[test]
fn phases_follow_elapsed_after_finish() {
    let at = |eaf: f64| FinaleState::at(TOTAL + eaf, TOTAL).phase;
    assert_eq!(FinaleState::at(0.0, TOTAL).phase, FinalePhase::Assembling);
    assert_eq!(FinaleState::at(TOTAL - 1.0, TOTAL).phase, FinalePhase::Assembling);
    assert_eq!(at(0.0), FinalePhase::Pause);
    assert_eq!(at(15_000.0), FinalePhase::Pause);
    assert_eq!(at(PAUSE_MS), FinalePhase::Pause);
    assert_eq!(at(PAUSE_MS + 1.0), FinalePhase::Wave);
    assert_eq!(at(EXPLODE_AT_MS - 1.0), FinalePhase::Wave);
    assert_eq!(at(EXPLODE_AT_MS), FinalePhase::Exploding);
    assert_eq!(at(OUTRO_START_MS), FinalePhase::Outro);
    assert_eq!(at(FINISH_MS), FinalePhase::Finished);
    assert_eq!(at(1e9), FinalePhase::Finished);
}

#[test]
fn negative_and_nan_elapsed_are_assembling() {
    assert_eq!(FinaleState::at(-5.0, TOTAL).phase, FinalePhase::Assembling);
    let s = FinaleState::at(f64::NAN, TOTAL);
    assert_eq!(s.phase, FinalePhase::Assembling);
    assert_eq!(s.zoom(), 1.0);
}

#[test]
fn zoom_creeps_and_is_capped() {
    assert_eq!(FinaleState::at(TOTAL - 1.0, TOTAL).zoom(), 1.0);
    let z = FinaleState::at(TOTAL + 8_000.0, TOTAL).zoom();
    assert!((z - 1.1).abs() < 1e-12);
    assert_eq!(FinaleState::at(TOTAL + 1e8, TOTAL).zoom(), MAX_FINALE_ZOOM);
}

#[test]
fn explosion_due_only_after_trigger() {
    assert!(!FinaleState::at(TOTAL + EXPLODE_AT_MS - 1.0, TOTAL).explosion_due());
    assert!(FinaleState::at(TOTAL + EXPLODE_AT_MS, TOTAL).explosion_due());
    assert!(FinaleState::at(TOTAL + EXPLODE_AT_MS, TOTAL).phase.is_explosion());
    assert!(!FinalePhase::Wave.is_explosion());
}

#[test]
fn outro_fades_in() {
    assert_eq!(FinaleState::at(TOTAL + OUTRO_START_MS - 1.0, TOTAL).outro_alpha(), 0.0);
    assert_eq!(FinaleState::at(TOTAL + OUTRO_START_MS - 1.0, TOTAL).outro_elapsed(), None);
    let mid = FinaleState::at(TOTAL + OUTRO_START_MS + OUTRO_FADE_MS / 2.0, TOTAL);
    assert!((mid.outro_alpha() - 0.5).abs() < 1e-9);
    assert_eq!(mid.outro_elapsed(), Some(OUTRO_FADE_MS / 2.0));
    assert_eq!(FinaleState::at(TOTAL + FINISH_MS, TOTAL).outro_alpha(), 1.0);
}

#[test]
fn wave_bob_is_zero_outside_window_and_upward_inside() {
    let p = piece(0.0);
    assert_eq!(FinaleState::at(TOTAL + 1000.0, TOTAL).diagonal_wave_y(&p), 0.0);
    let crest = FinaleState::at(TOTAL + PAUSE_MS + WAVE_PIECE_MS / 2.0, TOTAL);
    assert!((crest.diagonal_wave_y(&p) + WAVE_AMPLITUDE).abs() < 1e-9);
    let done = FinaleState::at(TOTAL + PAUSE_MS + WAVE_PIECE_MS + 1.0, TOTAL);
    assert!(done.diagonal_wave_y(&p).abs() < 1e-9);
}

#[test]
fn wave_reads_cached_delay() {
    let t = PAUSE_MS + WAVE_PIECE_MS / 2.0;
    let near = piece(0.0);
    let far = piece(1.0);
    let s = FinaleState::at(TOTAL + t, TOTAL);
    assert!(s.diagonal_wave_y(&near) < -60.0);
    assert_eq!(s.diagonal_wave_y(&far), 0.0);

    let later = FinaleState::at(TOTAL + t + (WAVE_MS - WAVE_PIECE_MS), TOTAL);
    assert!((later.diagonal_wave_y(&far) + WAVE_AMPLITUDE).abs() < 1e-9);
    assert_eq!(far.wave_delay(), 1.0);
}

#[test]
fn scenario_b_seventy_five_seconds_is_still_pause() {
    let s = FinaleState::at(75_000.0, TOTAL);
    assert_eq!(s.phase, FinalePhase::Pause);
    assert!(!s.explosion_due());
}
