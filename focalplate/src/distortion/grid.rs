//! Empirical 23 x 23 correction grid applied on the positioner side of the
//! linear plate model.
//!
//! The grid file is plain text, one row per grid point:
//!
//! ```text
//! # gx      gy       ...  ...  dx     dy    (further columns ignored)
//! -253000  -253000   0    0    1.25  -0.40
//! ```
//!
//! Columns 1-2 locate the cell, columns 5-6 are the correction in microns.

use crate::error::{PlateError, PlateResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const GRID_SIZE: usize = 23;
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;
/// Cell pitch, microns.
pub const GRID_STEP_UM: f64 = 23_000.0;
/// Offset that moves plate coordinates into the grid's first quadrant, microns.
pub const GRID_CENTRE_OFFSET_UM: f64 = 276_000.0;

/// Minimum number of whitespace-separated columns in a data row.
const MIN_COLUMNS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct DistortionMapGrid {
    corrections: Vec<(f64, f64)>,
    loaded: bool,
}

impl Default for DistortionMapGrid {
    fn default() -> Self {
        Self::empty()
    }
}

/// Rounded, clamped 1-based grid coordinate along one axis.
fn axis_index(value: f64) -> usize {
    let cell = ((value + GRID_CENTRE_OFFSET_UM) / GRID_STEP_UM).round();
    // NaN compares false against both bounds and falls through to 1.
    if cell >= GRID_SIZE as f64 {
        GRID_SIZE
    } else if cell >= 1.0 {
        cell as usize
    } else {
        1
    }
}

impl DistortionMapGrid {
    /// A grid that applies no correction.
    pub fn empty() -> Self {
        Self {
            corrections: Vec::new(),
            loaded: false,
        }
    }

    /// Builds a loaded grid from 529 corrections in flattened index order.
    pub fn from_corrections(corrections: Vec<(f64, f64)>) -> PlateResult<Self> {
        if corrections.len() != GRID_CELLS {
            return Err(PlateError::distortion_map(
                PathBuf::new(),
                format!("expected {GRID_CELLS} corrections, got {}", corrections.len()),
            ));
        }
        Ok(Self {
            corrections,
            loaded: true,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Flattened cell index for a plate position in microns.
    ///
    /// Always in `0..GRID_CELLS`; positions off the grid use the nearest
    /// edge cell.
    pub fn index_for(x: f64, y: f64) -> usize {
        let ix = axis_index(x) - 1;
        let iy = axis_index(y) - 1;
        iy * GRID_SIZE + ix
    }

    /// Stored correction for a flattened index, if the grid is loaded.
    pub fn correction(&self, index: usize) -> Option<(f64, f64)> {
        if self.loaded {
            self.corrections.get(index).copied()
        } else {
            None
        }
    }

    /// Adds (`positive`) or subtracts the correction of the cell containing
    /// `(x, y)`. Unloaded grids return the input unchanged.
    pub fn apply(&self, positive: bool, x: f64, y: f64) -> (f64, f64) {
        match self.correction(Self::index_for(x, y)) {
            Some((dx, dy)) if positive => (x + dx, y + dy),
            Some((dx, dy)) => (x - dx, y - dy),
            None => (x, y),
        }
    }

    /// Parses grid text. `path` is only used in error messages.
    pub fn parse(text: &str, negate: bool, path: &Path) -> PlateResult<Self> {
        let mut corrections = vec![(0.0, 0.0); GRID_CELLS];
        let mut filled = [false; GRID_CELLS];
        let mut rows = 0usize;
        let sign = if negate { -1.0 } else { 1.0 };

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < MIN_COLUMNS {
                return Err(PlateError::distortion_map(
                    path,
                    format!(
                        "line {}: expected at least {MIN_COLUMNS} columns, found {}",
                        line_no + 1,
                        fields.len()
                    ),
                ));
            }
            let mut values = [0.0f64; MIN_COLUMNS];
            for (value, field) in values.iter_mut().zip(&fields) {
                *value = field.parse().map_err(|_| {
                    PlateError::distortion_map(
                        path,
                        format!("line {}: cannot parse {field:?}", line_no + 1),
                    )
                })?;
            }
            rows += 1;
            if rows > GRID_CELLS {
                return Err(PlateError::distortion_map(
                    path,
                    format!("more than {GRID_CELLS} data rows"),
                ));
            }
            let index = Self::index_for(values[0], values[1]);
            if std::mem::replace(&mut filled[index], true) {
                return Err(PlateError::distortion_map(
                    path,
                    format!(
                        "line {}: cell at ({}, {}) already has a correction",
                        line_no + 1,
                        values[0],
                        values[1]
                    ),
                ));
            }
            corrections[index] = (sign * values[4], sign * values[5]);
        }

        if rows != GRID_CELLS {
            return Err(PlateError::distortion_map(
                path,
                format!("expected {GRID_CELLS} data rows, found {rows}"),
            ));
        }
        Ok(Self {
            corrections,
            loaded: true,
        })
    }

    /// Loads a grid file. A missing file yields an empty grid; an unreadable
    /// or malformed one is an error.
    pub fn load(path: &Path, negate: bool) -> PlateResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no distortion map; grid correction disabled");
                return Ok(Self::empty());
            }
            Err(err) => return Err(PlateError::io(path, err)),
        };
        let grid = Self::parse(&text, negate, path)?;
        info!(path = %path.display(), negate, "loaded distortion map");
        Ok(grid)
    }
}
