//! A constraint whose region must collectively realize one of several
//! symbol multisets.

use std::fmt;

use itertools::Itertools;
use tracing::debug;

use crate::{
    error::{PuzzleError, Result},
    solver::{
        constraint::Constraint,
        coords::Region,
        puzzle::Puzzle,
        symbols::{SymbolList, SymbolSet},
    },
};

/// Asserts that the region's `n` cells realize one of the given symbol
/// lists of length `n`, in some order.
///
/// This generalizes a permutation: a list may repeat a symbol, so the
/// presence of a symbol in one cell does not imply its absence elsewhere.
/// The union of all lists bounds every cell's candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSymbolLists {
    region: Region,
    lists: Vec<SymbolList>,
    symbols: SymbolSet,
}

impl RegionSymbolLists {
    pub fn new(region: Region, lists: Vec<SymbolList>) -> Result<Self> {
        if lists.is_empty() {
            return Err(PuzzleError::NoSymbolLists.into());
        }
        for list in &lists {
            if list.len() != region.len() {
                return Err(PuzzleError::ListArity {
                    len: list.len(),
                    cells: region.len(),
                }
                .into());
            }
        }
        let symbols = lists
            .iter()
            .fold(SymbolSet::new(), |union, list| union.union(&list.as_set()));
        Ok(Self {
            region,
            lists,
            symbols,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn lists(&self) -> &[SymbolList] {
        &self.lists
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
        if let Some(result) = self.make_permutation(puzzle)? {
            return Ok(result);
        }
        Ok(vec![self.clone().into()])
    }

    fn empty(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.region.is_empty() {
            puzzle.log_technique("empty");
            return Ok(Some(vec![]));
        }
        Ok(None)
    }

    /// Drops any list that mentions a symbol outside the alphabet; one
    /// list per pass keeps the rewrite simple.
    fn filter_from_puzzle(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let alphabet = puzzle.symbols.as_ref().unwrap();
        let Some(position) = self
            .lists
            .iter()
            .position(|list| list.iter().any(|symbol| !alphabet.contains(symbol)))
        else {
            return Ok(None);
        };

        let mut remaining = self.lists.clone();
        let dropped = remaining.remove(position);
        debug!(%dropped, "dropping symbol list outside the alphabet");
        puzzle.log_technique("filterFromPuzzle");
        if remaining.is_empty() {
            // No realizable multiset is left, so the region is infeasible.
            let grid = puzzle.solution.as_mut().unwrap();
            grid.intersect_throughout(&self.region, &SymbolSet::new());
            return Ok(Some(vec![]));
        }
        Ok(Some(vec![
            RegionSymbolLists::new(self.region.clone(), remaining)?.into(),
        ]))
    }

    fn solo(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.symbols.len() == 1 {
            let grid = puzzle.solution.as_mut().unwrap();
            grid.intersect_throughout(&self.region, &self.symbols);
            puzzle.log_technique("solo");
            return Ok(Some(vec![]));
        }
        Ok(None)
    }

    fn filter(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let grid = puzzle.solution.as_mut().unwrap();
        let changed = grid.intersect_throughout(&self.region, &self.symbols);
        if !changed.is_empty() {
            puzzle.log_technique("filter");
        }
        Ok(None)
    }

    /// A lone repeat-free list is just a permutation.
    fn make_permutation(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.lists.len() == 1 && self.symbols.len() == self.region.len() {
            let permutation = super::permutation::RegionPermutesSymbols::new(
                self.region.clone(),
                self.symbols.clone(),
            )?;
            debug!(from = %self, to = %permutation, "reducing a lone symbol list to a permutation");
            puzzle.log_technique("makePermutation");
            return Ok(Some(vec![permutation.into()]));
        }
        Ok(None)
    }
}

impl fmt::Display for RegionSymbolLists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegionSymbolLists: one of [{}] in {}",
            self.lists.iter().join(", "),
            self.region
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::{
        constraints::permutation::RegionPermutesSymbols,
        coords::Coord,
        grid::{Cell, Grid},
    };

    use super::*;

    fn list(symbols: &[&str]) -> SymbolList {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn set(symbols: &[&str]) -> SymbolSet {
        symbols.iter().copied().collect()
    }

    fn ready_puzzle(grid: &str, max: usize) -> Puzzle {
        let mut puzzle = Puzzle::new();
        puzzle.assign_initial(Grid::parse(grid).unwrap()).unwrap();
        puzzle
            .assign_symbols((1..=max).map(|d| d.to_string()).collect())
            .unwrap();
        puzzle
    }

    #[test]
    fn every_list_must_fit_the_region() {
        let region = Region::parse("a1-a2").unwrap();
        assert!(RegionSymbolLists::new(region.clone(), vec![list(&["1"])]).is_err());
        assert!(RegionSymbolLists::new(region, vec![]).is_err());
    }

    #[test]
    fn cells_are_narrowed_to_the_union_of_lists() {
        let mut puzzle = ready_puzzle("**", 9);
        let region = Region::parse("a1-a2").unwrap();
        let constraint = RegionSymbolLists::new(
            region.clone(),
            vec![list(&["1", "4"]), list(&["2", "2"])],
        )
        .unwrap();

        puzzle
            .solution
            .as_mut()
            .unwrap()
            .intersect_throughout(&region, &set(&["1", "2", "3", "4", "5"]));
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(result, vec![constraint.clone().into()]);
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 0)),
            &Cell::Candidates(set(&["1", "2", "4"]))
        );
        assert!(puzzle.stats.used("filter"));
    }

    #[test]
    fn lists_outside_the_alphabet_are_dropped() {
        let mut puzzle = ready_puzzle("**", 4);
        let region = Region::parse("a1-a2").unwrap();
        let constraint = RegionSymbolLists::new(
            region.clone(),
            vec![list(&["1", "8"]), list(&["2", "2"])],
        )
        .unwrap();

        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(
            result,
            vec![RegionSymbolLists::new(region, vec![list(&["2", "2"])]).unwrap().into()]
        );
        assert!(puzzle.stats.used("filterFromPuzzle"));
    }

    #[test]
    fn a_lone_repeat_free_list_becomes_a_permutation() {
        let mut puzzle = ready_puzzle("**", 4);
        let region = Region::parse("a1-a2").unwrap();
        let constraint =
            RegionSymbolLists::new(region.clone(), vec![list(&["2", "3"])]).unwrap();

        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(
            result,
            vec![RegionPermutesSymbols::new(region, set(&["2", "3"])).unwrap().into()]
        );
        assert!(puzzle.stats.used("makePermutation"));
    }

    #[test]
    fn a_repeating_list_stays_a_list() {
        let mut puzzle = ready_puzzle("225", 9);
        let region = Region::parse("a1-a3").unwrap();
        let constraint =
            RegionSymbolLists::new(region, vec![list(&["2", "2", "5"])]).unwrap();
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(result, vec![constraint.into()]);
    }
}
