use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(128, 128), 64);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn clamp01_maps_nan_to_zero() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-2.0), 0.0);
    assert_eq!(clamp01(3.0), 1.0);
}

#[test]
fn lerp_point_interpolates_both_axes() {
    let p = lerp_point(Point::new(0.0, 10.0), Point::new(10.0, 30.0), 0.25);
    assert_eq!(p, Point::new(2.5, 15.0));
}
