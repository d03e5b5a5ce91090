//! Boolean occupancy grid of a floor's traversable area.
//!
//! Cell `(i, j)` covers `[i * cell_size, (i + 1) * cell_size)` along x and the
//! same along y, with the grid anchored at the world origin. A cell is open
//! when its center lies inside (or on the boundary of) the geometry.

use crate::geometry::TraversableGeometry;
use thiserror::Error;
use tracing::debug;

// Absorbs float noise in the extent so that a 10 m floor at 1 m cells is
// 10 cells wide, not 11.
const EXTENT_TOLERANCE: f64 = 1e-9;

/// Upper bound on `width * height` for a single grid.
pub const MAX_CELLS: usize = 1 << 28;

#[derive(Debug, Error, PartialEq)]
#[error("cell size must be a positive finite number, got {0}")]
pub struct InvalidCellSizeError(pub f64);

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error(transparent)]
    InvalidCellSize(#[from] InvalidCellSizeError),
    #[error("{columns} x {rows} cells at {cell_size} m exceeds the limit of {} cells", MAX_CELLS)]
    TooLarge {
        columns: f64,
        rows: f64,
        cell_size: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    cells: Vec<bool>,
    width: usize,
    height: usize,
    cell_size: f64,
}

impl OccupancyGrid {
    /// Rasterize `geometry` into square cells of `cell_size` meters.
    pub fn build(
        geometry: &TraversableGeometry,
        cell_size: f64,
    ) -> Result<Self, GridError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(InvalidCellSizeError(cell_size).into());
        }

        let (columns, rows) = match geometry.bounds() {
            Some(bounds) => (
                cell_count(bounds.max().x, cell_size),
                cell_count(bounds.max().y, cell_size),
            ),
            None => (0.0, 0.0),
        };
        let limit = MAX_CELLS as f64;
        if columns > limit || rows > limit || columns * rows > limit {
            return Err(GridError::TooLarge {
                columns,
                rows,
                cell_size,
            });
        }
        let (width, height) = (columns as usize, rows as usize);
        let len = width
            .checked_mul(height)
            .filter(|len| *len <= MAX_CELLS)
            .ok_or(GridError::TooLarge {
                columns,
                rows,
                cell_size,
            })?;

        let mut grid = Self {
            cells: vec![false; len],
            width,
            height,
            cell_size,
        };
        for j in 0..height {
            for i in 0..width {
                let (x, y) = grid.index_to_coords(i, j);
                grid.cells[j * width + i] = geometry.contains(x, y);
            }
        }

        debug!(
            width,
            height,
            cell_size,
            open = grid.traversable_count(),
            "Occupancy grid built"
        );
        Ok(grid)
    }

    /// Number of cells along x.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells along y.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Open/blocked state of a cell, `None` outside the grid.
    pub fn is_traversable(&self, i: usize, j: usize) -> Option<bool> {
        if i < self.width && j < self.height {
            Some(self.cells[j * self.width + i])
        } else {
            None
        }
    }

    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|open| **open).count()
    }

    /// World coordinates of the center of cell `(i, j)`.
    pub fn index_to_coords(&self, i: usize, j: usize) -> (f64, f64) {
        (
            (i as f64 + 0.5) * self.cell_size,
            (j as f64 + 0.5) * self.cell_size,
        )
    }

    /// Index of the cell nearest to `(x, y)`; may lie outside the grid.
    ///
    /// Ties on a cell edge resolve to the even index.
    pub fn coords_to_index(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size - 0.5).round_ties_even() as i64,
            (y / self.cell_size - 0.5).round_ties_even() as i64,
        )
    }

    /// Like [`coords_to_index`](Self::coords_to_index), limited to valid cells.
    /// Non-finite coordinates have no cell.
    pub fn coords_to_index_checked(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let (i, j) = self.coords_to_index(x, y);
        let i = usize::try_from(i).ok().filter(|i| *i < self.width)?;
        let j = usize::try_from(j).ok().filter(|j| *j < self.height)?;
        Some((i, j))
    }

    /// Text rendering, `.` open and `#` blocked, highest row first.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for j in (0..self.height).rev() {
            for i in 0..self.width {
                let open = self.cells[j * self.width + i];
                out.push(if open { '.' } else { '#' });
            }
            out.push('\n');
        }
        out
    }
}

// Whole cells needed to reach `extent`, as a float so callers can bound it
// before converting.
fn cell_count(extent: f64, cell_size: f64) -> f64 {
    let cells = extent / cell_size;
    if cells <= 0.0 {
        return 0.0;
    }
    (cells - EXTENT_TOLERANCE).ceil()
}
