use super::*;
use kurbo::{PathEl, Shape};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn all_points(path: &BezPath) -> Vec<Point> {
    let mut out = Vec::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => out.push(p),
            PathEl::QuadTo(a, b) => out.extend([a, b]),
            PathEl::CurveTo(a, b, c) => out.extend([a, b, c]),
            PathEl::ClosePath => {}
        }
    }
    out
}

#[test]
fn shared_edges_are_antisymmetric() {
    let dims = GridDims { rows: 9, cols: 7 };
    let grid = ConnectionGrid::random(dims, &mut StdRng::seed_from_u64(7));
    for row in 0..dims.rows {
        for col in 0..dims.cols {
            let c = grid.get(col, row);
            if col + 1 < dims.cols {
                assert_ne!(c.right, 0);
                assert_eq!(c.right, -grid.get(col + 1, row).left);
            }
            if row + 1 < dims.rows {
                assert_ne!(c.bottom, 0);
                assert_eq!(c.bottom, -grid.get(col, row + 1).top);
            }
        }
    }
}

#[test]
fn border_edges_are_flat() {
    let dims = GridDims { rows: 4, cols: 5 };
    let grid = ConnectionGrid::random(dims, &mut StdRng::seed_from_u64(1));
    for col in 0..dims.cols {
        assert_eq!(grid.get(col, 0).top, 0);
        assert_eq!(grid.get(col, dims.rows - 1).bottom, 0);
    }
    for row in 0..dims.rows {
        assert_eq!(grid.get(0, row).left, 0);
        assert_eq!(grid.get(dims.cols - 1, row).right, 0);
    }
    assert_eq!(grid.get(99, 0), Connections::default());
}

#[test]
fn flat_outline_is_the_cell_rectangle() {
    let path = piece_outline(Size::new(40.0, 60.0), Connections::default());
    assert!((path.area().abs() - 2400.0).abs() < 1e-9);
    let bb = path.bounding_box();
    assert_eq!((bb.x0, bb.y0, bb.x1, bb.y1), (0.0, 0.0, 40.0, 60.0));
}

#[test]
fn tab_reaches_full_depth_and_blank_removes_area() {
    let size = Size::new(100.0, 80.0);
    let tab = piece_outline(
        size,
        Connections {
            right: 1,
            ..Default::default()
        },
    );
    let bb = tab.bounding_box();
    assert!((bb.x1 - (100.0 + TAB_DEPTH * 80.0)).abs() < 1e-6);
    assert!(tab.area().abs() > 8000.0);

    let blank = piece_outline(
        size,
        Connections {
            right: -1,
            ..Default::default()
        },
    );
    assert!((blank.bounding_box().x1 - 100.0).abs() < 1e-9);
    let removed = 8000.0 - blank.area().abs();
    let added = tab.area().abs() - 8000.0;
    assert!(removed > 0.0);
    assert!((removed - added).abs() < 1e-6);
}

#[test]
fn tab_and_neighbor_blank_trace_the_same_curve() {
    let size = Size::new(90.0, 90.0);
    let a = piece_outline(
        size,
        Connections {
            right: 1,
            ..Default::default()
        },
    );
    let b = piece_outline(
        size,
        Connections {
            left: -1,
            ..Default::default()
        },
    );
    let b_points: Vec<Point> = all_points(&b)
        .into_iter()
        .map(|p| p + Vec2::new(90.0, 0.0))
        .collect();
    for p in all_points(&a).into_iter().filter(|p| p.x > 90.0 + 1e-9) {
        assert!(
            b_points.iter().any(|q| (*q - p).hypot() < 1e-9),
            "tab point {p:?} missing from neighbor blank"
        );
    }
}

#[test]
fn tab_joins_are_smooth() {
    let path = piece_outline(
        Size::new(120.0, 120.0),
        Connections {
            top: 1,
            ..Default::default()
        },
    );
    let els = path.elements();
    // MoveTo, LineTo(neck base), six cubics, LineTo(corner).
    let mut current = Point::ZERO;
    let mut incoming: Option<Vec2> = None;
    for el in &els[..9] {
        let (first_handle, last_handle, end) = match *el {
            PathEl::MoveTo(p) => {
                current = p;
                continue;
            }
            PathEl::LineTo(p) => (p, current, p),
            PathEl::CurveTo(a, b, c) => (a, b, c),
            _ => panic!("unexpected element {el:?}"),
        };
        let outgoing = first_handle - current;
        if let Some(inc) = incoming {
            let cross = inc.cross(outgoing);
            assert!(cross.abs() < 1e-6 * inc.hypot() * outgoing.hypot());
            assert!(inc.dot(outgoing) > 0.0);
        }
        incoming = Some(end - last_handle);
        current = end;
    }
}

#[test]
fn tab_head_is_wider_than_neck() {
    assert!(TAB_HEAD > TAB_NECK);
    assert!(HEAD_L < NECK_L && NECK_R < HEAD_R);
}
