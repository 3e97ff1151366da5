use super::*;

#[test]
fn stopped_clock_reads_zero() {
    let mut c = PlaybackClock::new();
    assert_eq!(c.elapsed(5000.0), 0.0);
    assert!(!c.is_running());
    c.resume(10.0);
    assert!(!c.is_running());
}

#[test]
fn pause_freezes_and_resume_skips_the_gap() {
    let mut c = PlaybackClock::new();
    c.start(1000.0);
    assert_eq!(c.elapsed(1500.0), 500.0);
    c.pause(2000.0);
    assert_eq!(c.elapsed(9000.0), 1000.0);
    c.resume(10_000.0);
    assert_eq!(c.elapsed(10_250.0), 1250.0);
}

#[test]
fn elapsed_never_decreases() {
    let mut c = PlaybackClock::new();
    c.start(100.0);
    assert_eq!(c.elapsed(400.0), 300.0);
    assert_eq!(c.elapsed(200.0), 300.0);
    assert_eq!(c.elapsed(f64::NAN), 300.0);
}

#[test]
fn stop_then_start_begins_at_zero() {
    let mut c = PlaybackClock::new();
    c.start(0.0);
    c.elapsed(800.0);
    c.stop();
    assert!(!c.is_started());
    c.start(5000.0);
    assert_eq!(c.elapsed(5100.0), 100.0);
}
