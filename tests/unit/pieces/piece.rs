use super::*;

fn piece_at(target: Point) -> Piece {
    Piece {
        id: 1,
        source_rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        target,
        start: Point::new(500.0, 2400.0),
        size: Size::new(100.0, 50.0),
        rotation: 0.4,
        z_order: 0.5,
        assembly_order: 0,
        shape_sub_index: 0,
        connections: None,
        grid_x: 0,
        grid_y: 0,
        sector_index: 0,
        bitmap: None,
        wave_delay: diagonal_delay(target, Size::new(1080.0, 2280.0)),
    }
}

#[test]
fn target_center_is_middle_of_rect() {
    let p = piece_at(Point::new(200.0, 300.0));
    assert_eq!(p.target_center(), Point::new(250.0, 325.0));
    assert_eq!(p.target_rect(), Rect::new(200.0, 300.0, 300.0, 350.0));
    let path = p.motion_path();
    assert_eq!(path.target, p.target_center());
    assert_eq!(path.rotation, 0.4);
}

#[test]
fn diagonal_delay_spans_unit_range() {
    let board = Size::new(1080.0, 2280.0);
    assert_eq!(diagonal_delay(Point::ZERO, board), 0.0);
    assert!((diagonal_delay(Point::new(1080.0, 2280.0), board) - 1.0).abs() < 1e-12);
    assert_eq!(diagonal_delay(Point::new(5.0, 5.0), Size::ZERO), 0.0);
}

#[test]
fn unrenderable_without_bitmap() {
    assert!(!piece_at(Point::ZERO).is_renderable());
}
