//! The KenKen completeness check: every cell must belong to some cage.

use std::fmt;

use crate::{
    error::{PuzzleError, Result},
    solver::{
        constraint::Constraint,
        coords::Coord,
        grid::Grid,
        puzzle::Puzzle,
    },
};

/// Verifies that every coordinate of the grid lies inside at least one live
/// arithmetic cage, instantiating an uninitialized grid first if none was
/// supplied. The only constraint that reads the puzzle's constraint list.
///
/// The check runs on the pass in which the size becomes known, while the
/// configured cages are still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllCellsMustBeCovered;

impl AllCellsMustBeCovered {
    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        let Some((rows, cols)) = puzzle.size else {
            return Ok(vec![(*self).into()]);
        };
        if puzzle.solution.is_none() {
            puzzle.assign_solution(Grid::uninitialized(rows, cols))?;
        }

        for row in 0..rows {
            for col in 0..cols {
                let coord = Coord::new(row, col);
                let covered = puzzle.constraints.iter().any(|constraint| match constraint {
                    Constraint::MathOp(cage) => cage.region().contains(coord),
                    _ => false,
                });
                if !covered {
                    return Err(PuzzleError::UncoveredCell(coord).into());
                }
            }
        }
        Ok(vec![])
    }
}

impl fmt::Display for AllCellsMustBeCovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AllCellsMustBeCovered")
    }
}
