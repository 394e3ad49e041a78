//! A membership constraint: every cell of a region draws from a symbol set.

use std::fmt;

use tracing::debug;

use crate::{
    error::Result,
    solver::{
        constraint::Constraint,
        coords::Region,
        puzzle::Puzzle,
        symbols::SymbolSet,
    },
};

/// Asserts that every cell of `region` draws its value from `symbols`.
///
/// Unlike a permutation constraint there is no arity requirement and no
/// claim of distinctness; this is the workhorse for "one of these values"
/// residue constraints left behind by arithmetic cages.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSymbols {
    region: Region,
    symbols: SymbolSet,
}

impl RegionSymbols {
    pub fn new(region: Region, symbols: SymbolSet) -> Self {
        Self { region, symbols }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        if !puzzle.is_ready() {
            return Ok(vec![self.clone().into()]);
        }
        if let Some(result) = self.empty(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.filter_from_puzzle(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.solo(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.filter(puzzle)? {
            return Ok(result);
        }
        Ok(vec![self.clone().into()])
    }

    fn empty(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.region.is_empty() {
            debug!("discarding empty region");
            puzzle.log_technique("empty");
            return Ok(Some(vec![]));
        }
        Ok(None)
    }

    /// Narrows this constraint's symbols to the puzzle alphabet.
    fn filter_from_puzzle(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let alphabet = puzzle.symbols.as_ref().unwrap();
        let narrowed = self.symbols.intersection(alphabet);
        if narrowed != self.symbols {
            puzzle.log_technique("filterFromPuzzle");
            return Ok(Some(vec![
                RegionSymbols::new(self.region.clone(), narrowed).into(),
            ]));
        }
        Ok(None)
    }

    /// With a single symbol left, every cell must hold it.
    fn solo(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.symbols.len() == 1 {
            let grid = puzzle.solution.as_mut().unwrap();
            grid.intersect_throughout(&self.region, &self.symbols);
            puzzle.log_technique("solo");
            return Ok(Some(vec![]));
        }
        Ok(None)
    }

    /// Narrows every cell to this constraint's symbols.
    fn filter(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let grid = puzzle.solution.as_mut().unwrap();
        let changed = grid.intersect_throughout(&self.region, &self.symbols);
        if !changed.is_empty() {
            puzzle.log_technique("filter");
        }
        Ok(None)
    }
}

impl fmt::Display for RegionSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionSymbols: {} in {}", self.symbols, self.region)
    }
}
