use crate::foundation::error::{RevealError, RevealResult};

/// Rows and columns of a tessellation grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridDims {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
}

impl GridDims {
    /// Total number of cells.
    pub fn cells(self) -> u32 {
        self.rows * self.cols
    }
}

/// Grid approximating `count` cells while matching `aspect` (width / height).
///
/// `rows = round(sqrt(count / aspect))`, `cols = round(rows * aspect)`, both at least 1.
pub fn grid_for_count(count: u32, aspect: f64) -> RevealResult<GridDims> {
    if count == 0 {
        return Err(RevealError::validation("piece count must be > 0"));
    }
    if !aspect.is_finite() || aspect <= 0.0 {
        return Err(RevealError::validation("grid aspect must be finite and > 0"));
    }
    let rows = (f64::from(count) / aspect).sqrt().round().max(1.0);
    let cols = (rows * aspect).round().max(1.0);
    Ok(GridDims {
        rows: rows as u32,
        cols: cols as u32,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/grid.rs"]
mod tests;
