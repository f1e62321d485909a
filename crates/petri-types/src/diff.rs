//! Sparse cell-assignment diffs.
//!
//! A [`Diff`] is the wire representation of deltas: a sparse mapping
//! `x -> (y -> species)` meaning "set cell `(x, y)` to the given
//! species". An [`Species::Empty`] value kills the cell. Diffs flow in
//! both directions — clients paint with them, and the model broadcasts
//! them after every tick that changed the grid.
//!
//! Keys are held in `BTreeMap`s so a diff always serializes with its
//! columns and rows in ascending numeric order. `serde_json` maps the
//! integer keys to and from JSON object string keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::{GRID_DIM_X, GRID_DIM_Y};
use crate::species::Species;

/// Reasons a client-supplied diff is rejected.
///
/// Any of these causes the connection that sent the diff to be torn
/// down. Diffs built by the simulation itself are never validated (they
/// legitimately contain [`Species::Empty`] for cell deaths).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The diff carries no cells at all.
    #[error("diff contains no cells")]
    Empty,

    /// A column key lies outside `[0, GRID_DIM_X)`.
    #[error("column {0} is outside the grid")]
    ColumnOutOfRange(usize),

    /// A column maps to no rows.
    #[error("column {0} has no rows")]
    EmptyColumn(usize),

    /// A row key lies outside `[0, GRID_DIM_Y)`.
    #[error("row {y} in column {x} is outside the grid")]
    RowOutOfRange {
        /// The offending column.
        x: usize,
        /// The out-of-range row.
        y: usize,
    },

    /// A cell is assigned the dead-cell sentinel; clients may only
    /// paint live cells.
    #[error("cell ({x},{y}) carries the empty species")]
    EmptySpecies {
        /// The offending column.
        x: usize,
        /// The offending row.
        y: usize,
    },
}

/// A sparse set of cell assignments, keyed column-then-row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff {
    cells: BTreeMap<usize, BTreeMap<usize, Species>>,
}

impl Diff {
    /// Create an empty diff.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// Whether the diff assigns no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cell assignments in the diff.
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    /// Assign `(x, y)` to `species`, replacing any earlier assignment.
    pub fn set(&mut self, x: usize, y: usize, species: Species) {
        self.cells.entry(x).or_default().insert(y, species);
    }

    /// Look up the assignment for `(x, y)`, if any.
    pub fn get(&self, x: usize, y: usize) -> Option<Species> {
        self.cells.get(&x).and_then(|column| column.get(&y)).copied()
    }

    /// Copy every assignment of `incoming` into this diff.
    ///
    /// New entries overwrite old ones at the same cell, so the later
    /// writer wins.
    pub fn merge(&mut self, incoming: Self) {
        for (x, column) in incoming.cells {
            self.cells.entry(x).or_default().extend(column);
        }
    }

    /// Iterate over all assignments in ascending `(x, y)` order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Species)> + '_ {
        self.cells.iter().flat_map(|(&x, column)| {
            column.iter().map(move |(&y, &species)| (x, y, species))
        })
    }

    /// Check that the diff is an acceptable client paint request.
    ///
    /// All of the following must hold: the diff is non-empty; every
    /// column is inside the grid and maps at least one row; every row
    /// is inside the grid; and no value is the dead-cell sentinel.
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.cells.is_empty() {
            return Err(DiffError::Empty);
        }
        for (&x, column) in &self.cells {
            if x >= GRID_DIM_X {
                return Err(DiffError::ColumnOutOfRange(x));
            }
            if column.is_empty() {
                return Err(DiffError::EmptyColumn(x));
            }
            for (&y, &species) in column {
                if y >= GRID_DIM_Y {
                    return Err(DiffError::RowOutOfRange { x, y });
                }
                if species.is_empty() {
                    return Err(DiffError::EmptySpecies { x, y });
                }
            }
        }
        Ok(())
    }
}
