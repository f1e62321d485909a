//! The authoritative game grid.

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::diff::Diff;
use crate::species::Species;

/// Number of columns in the grid.
pub const GRID_DIM_X: usize = 120;

/// Number of rows in the grid.
pub const GRID_DIM_Y: usize = 120;

/// A fixed `GRID_DIM_X x GRID_DIM_Y` matrix of cells, indexed
/// column-then-row.
///
/// The grid is toroidal — the wrap-around itself lives in the
/// neighborhood scan, not here. It serializes as a nested
/// `[GRID_DIM_X][GRID_DIM_Y]` array of species tokens, which is the
/// snapshot a newly connected client receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Column-major cells; `columns[x][y]` is the cell at `(x, y)`.
    columns: Vec<[Species; GRID_DIM_Y]>,
}

impl Grid {
    /// Create an all-empty grid.
    pub fn new() -> Self {
        Self {
            columns: vec![[Species::Empty; GRID_DIM_Y]; GRID_DIM_X],
        }
    }

    /// Read the cell at `(x, y)`.
    ///
    /// Out-of-range coordinates read as [`Species::Empty`]; callers are
    /// expected to stay inside the grid.
    pub fn get(&self, x: usize, y: usize) -> Species {
        self.columns
            .get(x)
            .and_then(|column| column.get(y))
            .copied()
            .unwrap_or_default()
    }

    /// Write the cell at `(x, y)`. Out-of-range writes are dropped.
    pub fn set(&mut self, x: usize, y: usize, species: Species) {
        if let Some(cell) = self.columns.get_mut(x).and_then(|column| column.get_mut(y)) {
            *cell = species;
        }
    }

    /// Copy a diff into the grid; the diff wins at every cell it names.
    pub fn apply(&mut self, diff: &Diff) {
        for (x, y, species) in diff.iter() {
            self.set(x, y, species);
        }
    }

    /// Count the live cells in the grid.
    pub fn population(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|column| column.iter())
            .filter(|species| !species.is_empty())
            .count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut outer = serializer.serialize_seq(Some(GRID_DIM_X))?;
        for column in &self.columns {
            outer.serialize_element(&ColumnSlice(column))?;
        }
        outer.end()
    }
}

/// One grid column serialized as a `[GRID_DIM_Y]` array of tokens.
struct ColumnSlice<'a>(&'a [Species; GRID_DIM_Y]);

impl Serialize for ColumnSlice<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn starts_all_empty() {
        let grid = Grid::new();
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.get(0, 0), Species::Empty);
        assert_eq!(grid.get(119, 119), Species::Empty);
    }

    #[test]
    fn set_then_get() {
        let mut grid = Grid::new();
        let species: Species = "#aaaaaa".parse().unwrap();
        grid.set(30, 31, species);
        assert_eq!(grid.get(30, 31), species);
        assert_eq!(grid.population(), 1);
    }

    #[test]
    fn apply_copies_the_diff_in() {
        let mut grid = Grid::new();
        let diff: Diff =
            serde_json::from_str(r##"{"30":{"30":"#aaaaaa","31":"#bbbbbb"},"31":{"31":"#aaaaaa"}}"##)
                .unwrap();
        grid.apply(&diff);

        assert_eq!(grid.get(30, 30), "#aaaaaa".parse().unwrap());
        assert_eq!(grid.get(30, 31), "#bbbbbb".parse().unwrap());
        assert_eq!(grid.get(31, 31), "#aaaaaa".parse().unwrap());
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn apply_kills_cells_named_empty() {
        let mut grid = Grid::new();
        grid.set(5, 5, "#aaaaaa".parse().unwrap());

        let mut diff = Diff::new();
        diff.set(5, 5, Species::Empty);
        grid.apply(&diff);

        assert_eq!(grid.get(5, 5), Species::Empty);
    }

    #[test]
    fn snapshot_is_a_nested_array_of_tokens() {
        let mut grid = Grid::new();
        grid.set(0, 1, "#aaaaaa".parse().unwrap());

        let json = serde_json::to_string(&grid).unwrap();
        assert!(json.starts_with('['));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), GRID_DIM_X);
        let first = rows.first().and_then(|c| c.as_array()).unwrap();
        assert_eq!(first.len(), GRID_DIM_Y);
        assert_eq!(first.first().unwrap(), "");
        assert_eq!(first.get(1).unwrap(), "#aaaaaa");
    }
}
