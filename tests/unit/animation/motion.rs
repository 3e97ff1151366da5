use super::*;

fn path() -> MotionPath {
    MotionPath {
        start: Point::new(120.0, 2400.0),
        target: Point::new(640.0, 410.0),
        rotation: 0.8,
    }
}

#[test]
fn every_profile_settles_on_target() {
    let p = path();
    for profile in MotionProfile::ALL {
        let tr = transform(&p, 1.0, profile);
        assert!((tr.x - 640.0).abs() < 1e-9, "{profile:?}");
        assert!((tr.y - 410.0).abs() < 1e-9, "{profile:?}");
        assert!(tr.rotation.abs() < 1e-9, "{profile:?}");
        assert!((tr.scale - 1.0).abs() < 1e-9, "{profile:?}");
        assert!((tr.stretch - 1.0).abs() < 1e-9, "{profile:?}");
    }
}

#[test]
fn profiles_approach_target_continuously() {
    let p = path();
    for profile in MotionProfile::ALL {
        let tr = transform(&p, 0.9999, profile);
        assert!((tr.x - 640.0).abs() < 2.0, "{profile:?} x={}", tr.x);
        assert!((tr.y - 410.0).abs() < 2.0, "{profile:?} y={}", tr.y);
        assert!(tr.rotation.abs() < 0.01, "{profile:?}");
        assert!((tr.scale - 1.0).abs() < 0.01, "{profile:?}");
    }
}

#[test]
fn standard_starts_at_start_with_initial_tilt() {
    let tr = transform(&path(), 0.0, MotionProfile::Standard);
    assert_eq!(tr.center(), Point::new(120.0, 2400.0));
    assert!((tr.rotation - 0.8).abs() < 1e-12);
    assert!((tr.scale - 1.0).abs() < 1e-12);
}

#[test]
fn standard_scale_peaks_at_midpoint() {
    let tr = transform(&path(), 0.5, MotionProfile::Standard);
    assert!((tr.scale - 1.15).abs() < 1e-9);
}

#[test]
fn flight_swoops_above_straight_line() {
    let p = path();
    let tr = transform(&p, 0.5, MotionProfile::Flight);
    let straight_y = (p.start.y + p.target.y) / 2.0;
    assert!((straight_y - tr.y - 550.0).abs() < 1e-9);
    assert!((tr.scale - 1.45).abs() < 1e-9);
}

#[test]
fn vortex_grows_from_small_scale() {
    let p = path();
    let tr = transform(&p, 0.0, MotionProfile::Vortex);
    assert!((tr.scale - 0.4).abs() < 1e-12);
    let dist = (tr.center() - p.start).hypot();
    assert!((dist - 850.0).abs() < 1e-6);
}

#[test]
fn playful_bounces_upward_only() {
    let p = path();
    for i in 1..100 {
        let t = f64::from(i) / 100.0;
        let tr = transform(&p, t, MotionProfile::Playful);
        let base = lerp_point(p.start, p.target, Ease::InOutCubic.apply(t));
        assert!(tr.y <= base.y + 1e-9);
    }
}

#[test]
fn elastic_overshoots_after_snap() {
    let p = path();
    let at_snap = transform(&p, 0.82, MotionProfile::Elastic);
    assert!((at_snap.center() - p.target).hypot() < 1e-9);
    assert!((at_snap.scale - 1.0).abs() < 1e-9);
    let overshoot = transform(&p, 0.86, MotionProfile::Elastic);
    assert!(overshoot.scale > 1.0);
}

#[test]
fn progress_is_clamped() {
    let p = path();
    assert_eq!(
        transform(&p, 7.0, MotionProfile::Wave),
        MotionTransform::settled(p.target)
    );
    assert_eq!(
        transform(&p, -1.0, MotionProfile::Standard),
        transform(&p, 0.0, MotionProfile::Standard)
    );
}

#[test]
fn affine_places_local_origin_at_center() {
    let tr = MotionTransform {
        x: 10.0,
        y: 20.0,
        rotation: 0.0,
        scale: 2.0,
        stretch: 1.0,
    };
    assert_eq!(tr.to_affine() * Point::new(1.0, 1.0), Point::new(12.0, 22.0));
}

#[test]
fn profile_names_match_serde() {
    for profile in MotionProfile::ALL {
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, format!("\"{}\"", profile.name()));
    }
}
