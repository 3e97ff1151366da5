use std::collections::HashSet;

use super::*;

#[test]
fn square_cells_tile_the_canvas_exactly() {
    let t = tessellate(PieceShape::Square, 500).unwrap();
    assert_eq!(t.cells.len() as u32, t.dims.cells());
    let area: f64 = t.cells.iter().map(|c| c.rect.area()).sum();
    assert!((area - VIRTUAL_WIDTH * VIRTUAL_HEIGHT).abs() < 1e-6);
    let last = t.cells.last().unwrap().rect;
    assert!((last.x1 - VIRTUAL_WIDTH).abs() < 1e-9);
    assert!((last.y1 - VIRTUAL_HEIGHT).abs() < 1e-9);
}

#[test]
fn triangle_halves_the_grid_and_doubles_pieces() {
    let t = tessellate(PieceShape::Triangle, 500).unwrap();
    let square = tessellate(PieceShape::Square, 250).unwrap();
    assert_eq!(t.dims, square.dims);
    assert_eq!(t.cells.len() as u32, 2 * t.dims.cells());
    assert!(t.cells.iter().all(|c| c.sub_index < 2));
}

#[test]
fn diamond_cells_are_unique_even_parity() {
    let t = tessellate(PieceShape::Diamond, 400).unwrap();
    let mut seen = HashSet::new();
    for c in &t.cells {
        assert_eq!((c.grid_x + c.grid_y) % 2, 0);
        assert!(seen.insert((c.grid_x, c.grid_y)));
        assert!(overlaps_canvas(c.rect));
    }
}

#[test]
fn brick_never_places_a_cell_fully_off_canvas() {
    let t = tessellate(PieceShape::Brick, 300).unwrap();
    let canvas = virtual_rect();
    for c in &t.cells {
        let i = c.rect.intersect(canvas);
        assert!(i.area() > 0.0, "{c:?}");
    }
    let odd_row_first = t.cells.iter().find(|c| c.grid_y == 1).unwrap();
    assert!(odd_row_first.rect.x0 < 0.0);
}

#[test]
fn hexagon_columns_fill_the_width() {
    let t = tessellate(PieceShape::Hexagon, 300).unwrap();
    let size = t.cell_size;
    assert!((size.height - size.width * 3f64.sqrt() / 2.0).abs() < 1e-9);
    let max_x = t.cells.iter().map(|c| c.rect.x1).fold(f64::MIN, f64::max);
    assert!((max_x - VIRTUAL_WIDTH).abs() < 1e-6);
    let odd = t.cells.iter().find(|c| c.grid_x == 1 && c.grid_y == 0).unwrap();
    assert!((odd.rect.y0 - size.height / 2.0).abs() < 1e-9);
}

#[test]
fn sectors_split_the_canvas_three_by_three() {
    assert_eq!(sector_index(Point::new(0.0, 0.0)), 0);
    assert_eq!(sector_index(Point::new(VIRTUAL_WIDTH - 1.0, 0.0)), 2);
    assert_eq!(sector_index(virtual_rect().center()), 4);
    assert_eq!(sector_index(Point::new(-50.0, VIRTUAL_HEIGHT + 50.0)), 6);
}

#[test]
fn every_shape_yields_cells() {
    for shape in PieceShape::ALL {
        let t = tessellate(shape, 120).unwrap();
        assert!(!t.cells.is_empty(), "{shape:?}");
    }
}
