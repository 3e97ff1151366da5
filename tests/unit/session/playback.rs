use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::encode::sink::InMemorySink;
use crate::finale::phase::{EXPLODE_AT_MS, OUTRO_START_MS};
use crate::services::audio::CueTrack;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<(AudioCue, f64)>>>);

struct CapturingAudio {
    log: Captured,
    at: f64,
}

impl AudioCues for CapturingAudio {
    fn play(&mut self, cue: AudioCue, _volume: f32) {
        self.log.0.lock().unwrap().push((cue, self.at));
    }
    fn set_position_ms(&mut self, t_ms: f64) {
        self.at = t_ms;
    }
    fn output(&self) -> Option<AudioInputConfig> {
        None
    }
}

const TOTAL: f64 = 6_000.0;

fn config() -> RevealConfig {
    RevealConfig {
        piece_count: 40,
        scale: 0.05,
        total_duration_ms: TOTAL,
        piece_anim_ms: 1_000.0,
        fps: 5,
        seed: 11,
        ..RevealConfig::default()
    }
}

fn image(shade: u8) -> SourceImage {
    SourceImage::from_rgba8(9, 19, [shade, 90, 200, 255].repeat(9 * 19)).unwrap()
}

fn ready_session(audio: Box<dyn AudioCues>, physics: PhysicsBridge) -> RevealSession {
    let mut s = RevealSession::new(config(), physics, audio).unwrap();
    s.load_image(image(10));
    s.build_pieces(&mut |_| {}).unwrap();
    s
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = RevealConfig {
        fps: 0,
        ..config()
    };
    assert!(RevealSession::with_defaults(cfg).is_err());
}

#[test]
fn stale_builds_are_discarded() {
    let mut s = RevealSession::with_defaults(config()).unwrap();
    assert!(s.begin_build().is_err());

    s.load_image(image(10));
    let ticket = s.begin_build().unwrap();
    let img = s.image().unwrap().clone();
    let set = PieceBuilder::new()
        .build(&img, &s.config().build_opts(), &mut |_| {})
        .unwrap();

    s.load_image(image(200));
    let err = s.install(ticket, set).unwrap_err();
    assert!(matches!(err, RevealError::Validation(_)));
    assert!(!s.is_ready());

    s.build_pieces(&mut |_| {}).unwrap();
    assert!(s.is_ready());
    s.load_image(image(10));
    assert!(!s.is_ready());
}

#[test]
fn full_playback_fires_each_cue_and_finishes_once() {
    let log = Captured::default();
    let mut s = ready_session(
        Box::new(CapturingAudio {
            log: log.clone(),
            at: 0.0,
        }),
        PhysicsBridge::with_rapier(3),
    );
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    s.set_on_finished(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut exploded = 0;
    let mut physics_frames = 0;
    let mut t = 0.0;
    while t <= s.duration_ms() + 1000.0 {
        let r = s.render_at(t);
        exploded += r.exploded;
        if r.stats.physics_drawn > 0 {
            physics_frames += 1;
            assert!(r.phase.is_explosion());
        }
        t += 100.0;
    }
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(exploded > 0);
    assert_eq!(exploded, s.physics().body_count());
    assert!(physics_frames > 0);

    let log = log.0.lock().unwrap();
    let count = |c: AudioCue| log.iter().filter(|(x, _)| *x == c).count();
    assert_eq!(log[0].0, AudioCue::Whoosh);
    assert_eq!(count(AudioCue::Whoosh), 1);
    assert_eq!(count(AudioCue::Boom), 1);
    assert_eq!(count(AudioCue::Chime), 1);
    assert!(count(AudioCue::Snap) >= 1);
    let boom_at = log.iter().find(|(c, _)| *c == AudioCue::Boom).unwrap().1;
    assert!(boom_at >= TOTAL + EXPLODE_AT_MS);
    let chime_at = log.iter().find(|(c, _)| *c == AudioCue::Chime).unwrap().1;
    assert!(chime_at >= TOTAL + OUTRO_START_MS);
}

#[test]
fn missing_physics_still_finishes() {
    let mut s = ready_session(Box::new(SilentAudio), PhysicsBridge::new(None, 0));
    let r = s.render_at(TOTAL + EXPLODE_AT_MS + 500.0);
    assert_eq!(r.exploded, 0);
    assert_eq!(r.stats.physics_drawn, 0);
    assert_eq!(r.stats.settled_drawn, s.pieces().unwrap().renderable_count());
    assert!(s.render_at(s.duration_ms()).finished);
    assert!(!s.render_at(s.duration_ms() + 10.0).finished);
}

#[test]
fn seeking_back_rewinds_physics_without_replaying_cues() {
    let log = Captured::default();
    let mut s = ready_session(
        Box::new(CapturingAudio {
            log: log.clone(),
            at: 0.0,
        }),
        PhysicsBridge::with_rapier(3),
    );
    s.render_at(TOTAL + EXPLODE_AT_MS + 10.0);
    assert!(s.physics().is_activated());
    s.render_at(TOTAL + 1000.0);
    assert!(!s.physics().is_activated());
    assert_eq!(s.physics().body_count(), 0);

    let before = log.0.lock().unwrap().len();
    s.render_at(TOTAL + 2000.0);
    assert_eq!(log.0.lock().unwrap().len(), before);
}

#[test]
fn frames_before_build_render_background_only() {
    let mut s = RevealSession::with_defaults(config()).unwrap();
    let r = s.render_at(1000.0);
    assert_eq!(r.stats, FrameStats::default());
    assert_eq!(s.frame().data.len(), 54 * 114 * 4);
    assert!(s
        .render_video(InMemorySink::new(), None, Duration::from_secs(1))
        .is_err());
}

#[test]
fn render_video_streams_every_frame_until_finished() {
    let mut s = ready_session(Box::new(SilentAudio), PhysicsBridge::with_rapier(1));
    let rec = s
        .render_video(InMemorySink::new(), None, Duration::from_secs(5))
        .unwrap();
    let expected = config()
        .frame_rate()
        .unwrap()
        .frames_for_ms(s.duration_ms())
        + 1;
    assert_eq!(rec.frames, expected);
    assert_eq!(rec.sink.frames().len() as u64, expected);
    let cfg = rec.sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (54, 114));
    assert!(cfg.audio.is_none());
}

#[test]
fn recorded_cues_match_the_timeline() {
    let s = ready_session(Box::new(SilentAudio), PhysicsBridge::with_rapier(1));
    let mut track = CueTrack::new(0);
    s.record_cues(&mut track).unwrap();
    let ev = track.events();
    assert_eq!(ev[0].cue, AudioCue::Whoosh);
    assert_eq!(ev.iter().filter(|e| e.cue == AudioCue::Boom).count(), 1);
    let boom = ev.iter().find(|e| e.cue == AudioCue::Boom).unwrap();
    assert!(boom.at_ms >= TOTAL + EXPLODE_AT_MS);
    assert!(boom.at_ms < TOTAL + EXPLODE_AT_MS + 200.0 + 1.0);
}

#[test]
fn piece_ids_stay_unique_across_image_loads() {
    let mut s = RevealSession::with_defaults(config()).unwrap();
    s.load_image(image(10));
    s.build_pieces(&mut |_| {}).unwrap();
    let first: HashSet<u32> = s.pieces().unwrap().pieces().iter().map(|p| p.id).collect();

    s.load_image(image(200));
    s.build_pieces(&mut |_| {}).unwrap();
    let second: HashSet<u32> = s.pieces().unwrap().pieces().iter().map(|p| p.id).collect();

    assert_eq!(first.len(), second.len());
    assert!(first.is_disjoint(&second));
    let next = s.begin_build().unwrap().id_base;
    assert!(second.iter().all(|&id| id < next));
}

#[test]
fn a_second_install_from_the_same_ticket_is_stale() {
    let mut s = RevealSession::with_defaults(config()).unwrap();
    s.load_image(image(10));
    let ticket = s.begin_build().unwrap();
    let img = s.image().unwrap().clone();
    let opts = BuildOpts {
        id_base: ticket.id_base,
        ..s.config().build_opts()
    };
    let a = PieceBuilder::new().build(&img, &opts, &mut |_| {}).unwrap();
    let b = PieceBuilder::new().build(&img, &opts, &mut |_| {}).unwrap();
    s.install(ticket, a).unwrap();
    let err = s.install(ticket, b).unwrap_err();
    assert!(matches!(err, RevealError::Validation(_)));
}
