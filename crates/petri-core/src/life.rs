//! The cellular-automaton rule.
//!
//! Standard Conway rules drive life and death: a live cell survives
//! with two or three live neighbors, an empty cell is born with
//! exactly three. On top of that, every birth — and every survivor
//! whose neighborhood is dominated by another species — takes the
//! color of the most populous neighboring species. Ties between
//! species at the maximum count are broken uniformly at random.
//!
//! The neighborhood is toroidal: the left and right edges of the grid
//! are stitched together, as are the top and bottom.

use std::collections::HashMap;

use petri_types::{Diff, GRID_DIM_X, GRID_DIM_Y, Grid, Species};
use rand::Rng;

/// Index one step toward zero, wrapping at the edge.
const fn wrap_dec(i: usize, dim: usize) -> usize {
    match i.checked_sub(1) {
        Some(prev) => prev,
        None => dim.saturating_sub(1),
    }
}

/// Index one step away from zero, wrapping at the edge.
const fn wrap_inc(i: usize, dim: usize) -> usize {
    let next = i.saturating_add(1);
    if next == dim { 0 } else { next }
}

/// Count the live cells around `(x, y)` and pick the most populous
/// neighboring species.
///
/// When several species are tied at the maximum count, each tied
/// species is kept with probability `1/k` (reservoir sampling), so the
/// choice is uniform no matter how many species tie or in what order
/// they are visited.
fn neighbors(grid: &Grid, x: usize, y: usize, rng: &mut impl Rng) -> (u32, Species) {
    let left = wrap_dec(x, GRID_DIM_X);
    let right = wrap_inc(x, GRID_DIM_X);
    let up = wrap_dec(y, GRID_DIM_Y);
    let down = wrap_inc(y, GRID_DIM_Y);

    let mut counts: HashMap<Species, u32> = HashMap::new();
    for (nx, ny) in [
        (left, up),
        (x, up),
        (right, up),
        (left, y),
        (right, y),
        (left, down),
        (x, down),
        (right, down),
    ] {
        let species = grid.get(nx, ny);
        if !species.is_empty() {
            counts
                .entry(species)
                .and_modify(|count| *count = count.saturating_add(1))
                .or_insert(1);
        }
    }

    let mut live: u32 = 0;
    let mut dominant = Species::Empty;
    let mut dominant_count: u32 = 0;
    let mut tied: u32 = 0;
    for (&species, &count) in &counts {
        live = live.saturating_add(count);
        if count > dominant_count {
            dominant = species;
            dominant_count = count;
            tied = 1;
        } else if count == dominant_count {
            tied = tied.saturating_add(1);
            if rng.random_range(0..tied) == 0 {
                dominant = species;
            }
        }
    }
    (live, dominant)
}

/// Compute the changes between the grid's current state and its next
/// state, as a diff against the current state.
///
/// Only actual changes are written: a cell that survives with its own
/// color, or stays empty, never appears in the result.
pub fn next_state(grid: &Grid, rng: &mut impl Rng) -> Diff {
    let mut diff = Diff::new();
    for x in 0..GRID_DIM_X {
        for y in 0..GRID_DIM_Y {
            let (live, dominant) = neighbors(grid, x, y, rng);
            let current = grid.get(x, y);
            if current.is_empty() {
                if live == 3 {
                    diff.set(x, y, dominant);
                }
            } else if live != 2 && live != 3 {
                diff.set(x, y, Species::Empty);
            } else if current != dominant {
                diff.set(x, y, dominant);
            }
        }
    }
    diff
}
