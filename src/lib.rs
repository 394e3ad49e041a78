//! Gridlock solves grid-based logic puzzles declared as a composition of
//! constraints: Sudoku, KenKen, Latin squares, and their relatives.
//!
//! A puzzle is a grid of cells, an alphabet of symbols, and a list of
//! constraints drawn from a fixed taxonomy (row/column/region permutations
//! and arithmetic cages). Each cell carries the set of symbols it could
//! still hold; constraints repeatedly narrow those sets through named
//! *techniques* until every cell is determined, a contradiction surfaces,
//! or inference stalls and a depth-first search takes over.
//!
//! # Core Concepts
//!
//! - **[`Puzzle`]**: the driver. It owns the grid and the live constraint
//!   list, runs propagation passes to a fixed point, and searches when
//!   propagation stalls.
//! - **[`Constraint`]**: one rule of the puzzle. Applying a constraint
//!   returns the constraints that should replace it, so constraints can
//!   finish, defer, or rewrite themselves into sharper ones.
//! - **[`Grid`]**: the candidate state, with mutation primitives that
//!   track changes and feed the fixed-point test.
//! - **[`Loader`]**: JSON configuration intake, including the builtin
//!   puzzle families (`Sudoku`, `Sudoku6`, `Latin`, `KenKen`).
//!
//! # Example: A 2x2 Latin Square
//!
//! ```
//! use gridlock::{
//!     constraints::{digits::SymbolsAreDigits, permutation::EachRowAndColumnIsPermutation},
//!     Grid, Puzzle,
//! };
//!
//! let mut puzzle = Puzzle::new();
//! puzzle.assign_initial(Grid::parse("1*\n**").unwrap()).unwrap();
//! puzzle.add_constraint(SymbolsAreDigits::new(2).into());
//! puzzle.add_constraint(EachRowAndColumnIsPermutation.into());
//!
//! assert!(puzzle.solve().unwrap());
//! assert_eq!(
//!     puzzle.solution.as_ref().unwrap().to_string(),
//!     "[ 1 2\n  2 1 ]"
//! );
//! ```

pub mod error;
pub mod loader;
pub mod solver;

pub use error::{Error, PuzzleError, Result};
pub use loader::Loader;
pub use solver::{
    chess,
    constraint::Constraint,
    constraints,
    coords::{Coord, Region},
    grid::{Cell, ChangeHook, Grid},
    puzzle::{Puzzle, TechniqueHook},
    stats::{render_stats_table, SolveStats},
    symbols::{Symbol, SymbolList, SymbolSet},
};
