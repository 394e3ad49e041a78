//! The Latin-square family: a region whose cells contain each symbol of a
//! set exactly once, plus the shorthands that expand into it.

use std::fmt;

use tracing::debug;

use crate::{
    error::{PuzzleError, Result},
    solver::{
        constraint::Constraint,
        coords::{Coord, Region},
        grid::Cell,
        puzzle::Puzzle,
        symbols::SymbolSet,
    },
};

/// The `n` cells of `region` contain each of `n` distinct symbols exactly
/// once. The strongest and most-used constraint in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPermutesSymbols {
    region: Region,
    symbols: SymbolSet,
}

impl RegionPermutesSymbols {
    pub fn new(region: Region, symbols: SymbolSet) -> Result<Self> {
        if symbols.len() != region.len() {
            return Err(PuzzleError::PermutationArity {
                symbols: symbols.len(),
                cells: region.len(),
            }
            .into());
        }
        Ok(Self { region, symbols })
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
        if let Some(result) = self.filter_solution(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.partition(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.misfit(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.borrow(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.intersection(puzzle)? {
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

    /// Narrows this constraint's symbols to the puzzle alphabet. Shrinking
    /// them below the region size is a configuration error, surfaced by the
    /// replacement's arity check.
    fn filter_from_puzzle(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let alphabet = puzzle.symbols.as_ref().unwrap();
        let narrowed = self.symbols.intersection(alphabet);
        if narrowed != self.symbols {
            puzzle.log_technique("filterFromPuzzle");
            return Ok(Some(vec![
                RegionPermutesSymbols::new(self.region.clone(), narrowed)?.into(),
            ]));
        }
        Ok(None)
    }

    /// One symbol, one cell: place it and finish.
    fn solo(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.symbols.len() == 1 {
            let cell = self.region.first().unwrap();
            debug!(symbol = %self.symbols, %cell, "placing the last symbol");
            let grid = puzzle.solution.as_mut().unwrap();
            grid.intersect_at(cell, &self.symbols);
            puzzle.log_technique("solo");
            return Ok(Some(vec![]));
        }
        Ok(None)
    }

    /// Narrows every cell to this constraint's symbols.
    fn filter_solution(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let grid = puzzle.solution.as_mut().unwrap();
        let changed = grid.intersect_throughout(&self.region, &self.symbols);
        if !changed.is_empty() {
            puzzle.log_technique("filterSolution");
        }
        Ok(None)
    }

    /// When `k` cells share an identical candidate set of size `k`, those
    /// cells and symbols split off into their own permutation and the rest
    /// of the region sheds them. For `k = 1` this is how settled cells are
    /// removed from circulation.
    fn partition(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let grid = puzzle.solution.as_ref().unwrap();

        // Index candidate sets strictly smaller than the full symbol set,
        // keeping first-seen order for a deterministic tie-break.
        let mut index: Vec<(SymbolSet, Vec<Coord>)> = Vec::new();
        for coord in self.region.iter() {
            if let Cell::Candidates(set) = grid.at(coord) {
                if set.len() < self.symbols.len() {
                    match index.iter_mut().find(|(s, _)| s == set) {
                        Some((_, coords)) => coords.push(coord),
                        None => index.push((set.clone(), vec![coord])),
                    }
                }
            }
        }

        for (subset, coords) in index {
            if subset.len() != coords.len() {
                continue;
            }
            let remainder_region = self.region.subtract(&coords);
            let remainder_symbols = self.symbols.difference(&subset);
            debug!(
                subset = %subset,
                cells = %Region::new(coords.clone()),
                remainder = %remainder_symbols,
                "partitioning the region"
            );
            let limited = RegionPermutesSymbols::new(Region::new(coords), subset.clone())?;
            let remainder =
                RegionPermutesSymbols::new(remainder_region.clone(), remainder_symbols)?;
            let grid = puzzle.solution.as_mut().unwrap();
            grid.eliminate_throughout(&remainder_region, &subset)?;
            puzzle.log_technique("partition");
            return Ok(Some(vec![limited.into(), remainder.into()]));
        }
        Ok(None)
    }

    /// A symbol with exactly one home in the region must live there.
    fn misfit(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let grid = puzzle.solution.as_ref().unwrap();
        let index = grid.index_symbols_in(&self.region);
        for (symbol, coords) in index {
            if coords.len() == 1 && self.symbols.contains(&symbol) {
                let cell = coords[0];
                debug!(%symbol, %cell, "only one place for the symbol");
                let remainder = RegionPermutesSymbols::new(
                    self.region.subtract(&coords),
                    self.symbols.difference(&SymbolSet::singleton(symbol.clone())),
                )?;
                let grid = puzzle.solution.as_mut().unwrap();
                grid.set_cell(cell, Cell::singleton(symbol));
                puzzle.log_technique("misfit");
                return Ok(Some(vec![remainder.into()]));
            }
        }
        Ok(None)
    }

    /// Another permutation wholly inside this region claims its symbols, so
    /// the rest of this region gives them up.
    fn borrow(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        // The nested constraint's symbols must be drawn from ours, or it is
        // claiming nothing we hold; a stray symbol only happens on a
        // contradictory branch, which the grid will surface on its own.
        let nested: Option<RegionPermutesSymbols> = puzzle
            .constraints
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::RegionPermutesSymbols(other)
                    if other.region.is_proper_subset(&self.region)
                        && other.symbols.intersection(&self.symbols) == other.symbols =>
                {
                    Some(other.clone())
                }
                _ => None,
            })
            .next();
        let Some(other) = nested else {
            return Ok(None);
        };

        let remainder_region = self.region.subtract(other.region.cells());
        let remainder_symbols = self.symbols.difference(&other.symbols);
        debug!(
            inner = %other.region,
            outer = %self.region,
            "borrowing a nested permutation"
        );
        let remainder = RegionPermutesSymbols::new(remainder_region.clone(), remainder_symbols)?;
        let grid = puzzle.solution.as_mut().unwrap();
        grid.eliminate_throughout(&remainder_region, &other.symbols)?;
        puzzle.log_technique("borrow");
        Ok(Some(vec![remainder.into()]))
    }

    /// When another permutation overlaps this region and one of its symbols
    /// fits only inside the overlap, that symbol cannot appear in this
    /// region outside the overlap.
    fn intersection(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let overlapping: Vec<RegionPermutesSymbols> = puzzle
            .constraints
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::RegionPermutesSymbols(other) => Some(other.clone()),
                _ => None,
            })
            .filter(|other| {
                other.region != self.region && !other.region.is_subset(&self.region)
            })
            .collect();

        for other in overlapping {
            let overlap = self.region.intersect(&other.region);
            if overlap.is_empty() {
                continue;
            }
            let outside = self.region.subtract(overlap.cells());
            let index = puzzle
                .solution
                .as_ref()
                .unwrap()
                .index_symbols_in(&other.region);
            for (symbol, coords) in index {
                if !other.symbols.contains(&symbol) {
                    continue;
                }
                if !coords.iter().all(|&coord| overlap.contains(coord)) {
                    continue;
                }
                // The symbol is pinned inside the overlap.
                let grid = puzzle.solution.as_mut().unwrap();
                let changed =
                    grid.eliminate_throughout(&outside, &SymbolSet::singleton(symbol.clone()))?;
                if !changed.is_empty() {
                    debug!(%symbol, overlap = %overlap, "symbol is confined to the overlap");
                    puzzle.log_technique("intersection");
                    return Ok(Some(vec![self.clone().into()]));
                }
            }
        }
        Ok(None)
    }
}

impl fmt::Display for RegionPermutesSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegionPermutesSymbols: {} in {}",
            self.symbols, self.region
        )
    }
}

/// Becomes a [`RegionPermutesSymbols`] over the whole alphabet, once the
/// alphabet is known.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionIsCompletePermutation {
    region: Region,
}

impl RegionIsCompletePermutation {
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        match &puzzle.symbols {
            Some(symbols) => Ok(vec![
                RegionPermutesSymbols::new(self.region.clone(), symbols.clone())?.into(),
            ]),
            None => Ok(vec![self.clone().into()]),
        }
    }
}

impl fmt::Display for RegionIsCompletePermutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionIsCompletePermutation: {}", self.region)
    }
}

/// Expands immediately to one complete-permutation constraint per region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionsAreCompletePermutation {
    regions: Vec<Region>,
}

impl RegionsAreCompletePermutation {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn apply(&self, _puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        Ok(self
            .regions
            .iter()
            .cloned()
            .map(|region| RegionIsCompletePermutation::new(region).into())
            .collect())
    }
}

impl fmt::Display for RegionsAreCompletePermutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegionsAreCompletePermutation: {} regions",
            self.regions.len()
        )
    }
}

/// Expands to complete-permutation constraints for every row and every
/// column, once the size is known. Grids beyond 9x9 would be unnameable in
/// coordinate notation downstream, so they are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EachRowAndColumnIsPermutation;

impl EachRowAndColumnIsPermutation {
    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        let Some((rows, cols)) = puzzle.size else {
            return Ok(vec![(*self).into()]);
        };
        if rows > 9 || cols > 9 {
            return Err(PuzzleError::TooLargeForNotation(rows, cols).into());
        }

        let mut regions = Vec::with_capacity(rows + cols);
        for row in 0..rows {
            regions.push((0..cols).map(|col| Coord::new(row, col)).collect());
        }
        for col in 0..cols {
            regions.push((0..rows).map(|row| Coord::new(row, col)).collect());
        }
        Ok(vec![RegionsAreCompletePermutation::new(regions).into()])
    }
}

impl fmt::Display for EachRowAndColumnIsPermutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EachRowAndColumnIsPermutation")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::solver::grid::Grid;

    use super::*;

    fn set(symbols: &[&str]) -> SymbolSet {
        symbols.iter().copied().collect()
    }

    fn region(list: &str) -> Region {
        Region::parse(list).unwrap()
    }

    fn permutation(cells: &str, symbols: &[&str]) -> RegionPermutesSymbols {
        RegionPermutesSymbols::new(region(cells), set(symbols)).unwrap()
    }

    /// A puzzle with the given rows already as candidate sets; `.` cells
    /// keep the whole alphabet.
    fn puzzle_with(rows: &[&[&[&str]]], max: usize) -> Puzzle {
        let alphabet: SymbolSet = (1..=max).map(|d| d.to_string()).collect();
        let cells: Vec<Vec<Cell>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|symbols| {
                        if symbols.is_empty() {
                            Cell::Candidates(alphabet.clone())
                        } else {
                            Cell::Candidates(symbols.iter().copied().collect())
                        }
                    })
                    .collect()
            })
            .collect();
        let mut puzzle = Puzzle::new();
        puzzle
            .assign_initial(Grid::from_cells(cells).unwrap())
            .unwrap();
        puzzle.assign_symbols(alphabet).unwrap();
        puzzle
    }

    #[test]
    fn construction_requires_matching_arity() {
        assert!(RegionPermutesSymbols::new(region("a1-a2"), set(&["1"])).is_err());
        assert!(RegionPermutesSymbols::new(region("a1-a2"), set(&["1", "2"])).is_ok());
    }

    #[test]
    fn solo_places_the_last_symbol() {
        let mut puzzle = puzzle_with(&[&[&["1", "2"], &["2"]]], 2);
        let constraint = permutation("a1", &["1"]);
        assert!(constraint.apply(&mut puzzle).unwrap().is_empty());
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 0)),
            &Cell::singleton("1")
        );
        assert!(puzzle.stats.used("solo"));
    }

    #[test]
    fn filter_solution_narrows_cells() {
        let mut puzzle = puzzle_with(&[&[&[], &[], &["3"]]], 3);
        let constraint = permutation("a1-a2", &["1", "2"]);
        // partition finds nothing once the cells are narrowed to the pair.
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(result, vec![constraint.into()]);
        assert!(puzzle.stats.used("filterSolution"));
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 0)),
            &Cell::Candidates(set(&["1", "2"]))
        );
    }

    #[test]
    fn partition_splits_a_naked_pair() {
        let mut puzzle = puzzle_with(&[&[&["1", "2"], &["1", "2"], &[]]], 3);
        let constraint = permutation("a1-a3", &["1", "2", "3"]);
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(
            result,
            vec![
                permutation("a1-a2", &["1", "2"]).into(),
                permutation("a3", &["3"]).into(),
            ]
        );
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 2)),
            &Cell::Candidates(set(&["3"]))
        );
        assert!(puzzle.stats.used("partition"));
    }

    #[test]
    fn partition_removes_a_settled_cell() {
        let mut puzzle = puzzle_with(&[&[&["2"], &[], &[]]], 3);
        let constraint = permutation("a1-a3", &["1", "2", "3"]);
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(
            result,
            vec![
                permutation("a1", &["2"]).into(),
                permutation("a2-a3", &["1", "3"]).into(),
            ]
        );
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 1)),
            &Cell::Candidates(set(&["1", "3"]))
        );
    }

    #[test]
    fn misfit_finds_a_hidden_single() {
        let mut puzzle = puzzle_with(
            &[&[&["1", "2", "3"], &["2", "3"], &["2", "4"], &["3", "4"]]],
            4,
        );
        let constraint = permutation("a1-a4", &["1", "2", "3", "4"]);
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(
            result,
            vec![permutation("a2-a4", &["2", "3", "4"]).into()]
        );
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 0)),
            &Cell::singleton("1")
        );
        assert!(puzzle.stats.used("misfit"));
    }

    #[test]
    fn borrow_consumes_a_nested_permutation() {
        let mut puzzle = puzzle_with(&[&[&["1", "2"], &["2", "3"], &["1", "2", "3"]]], 3);
        puzzle.add_constraint(permutation("a1-a2", &["1", "2"]).into());

        let constraint = permutation("a1-a3", &["1", "2", "3"]);
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(result, vec![permutation("a3", &["3"]).into()]);
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 2)),
            &Cell::Candidates(set(&["3"]))
        );
        assert!(puzzle.stats.used("borrow"));
    }

    #[test]
    fn intersection_confines_a_symbol_to_the_overlap() {
        // Row a overlaps a box-like region in its first two cells; the box
        // admits symbol 1 only inside that overlap, so the rest of row a
        // sheds it.
        let mut puzzle = puzzle_with(
            &[
                &[&["1", "2"], &["1", "3"], &["1", "2", "3"]],
                &[&["2", "4"], &["3", "4"], &["2", "3", "4"]],
            ],
            4,
        );
        puzzle.add_constraint(
            RegionPermutesSymbols::new(region("a1 a2 b1 b2"), set(&["1", "2", "3", "4"]))
                .unwrap()
                .into(),
        );

        let constraint = permutation("a1-a3", &["1", "2", "3"]);
        let result = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(result, vec![constraint.clone().into()]);
        assert_eq!(
            puzzle.solution.as_ref().unwrap().at(Coord::new(0, 2)),
            &Cell::Candidates(set(&["2", "3"]))
        );
        assert!(puzzle.stats.used("intersection"));
    }

    #[test]
    fn shorthands_expand_in_stages() {
        let mut puzzle = Puzzle::new();
        puzzle
            .assign_initial(Grid::parse("**\n**").unwrap())
            .unwrap();

        // Rows and columns only need the size, which the grid supplies.
        let rows_and_cols = EachRowAndColumnIsPermutation;
        let expanded = rows_and_cols.apply(&mut puzzle).unwrap();
        let Some(Constraint::RegionsAreCompletePermutation(regions)) = expanded.first() else {
            panic!("expected a RegionsAreCompletePermutation, got {expanded:?}");
        };

        let per_region = regions.apply(&mut puzzle).unwrap();
        assert_eq!(per_region.len(), 4);

        // Complete permutations wait for the alphabet.
        let complete = RegionIsCompletePermutation::new(region("a1-a2"));
        assert_eq!(
            complete.apply(&mut puzzle).unwrap(),
            vec![complete.clone().into()]
        );
        puzzle.assign_symbols(set(&["1", "2"])).unwrap();
        assert_eq!(
            complete.apply(&mut puzzle).unwrap(),
            vec![permutation("a1-a2", &["1", "2"]).into()]
        );
    }

    #[test]
    fn rows_and_columns_refuse_unnotatable_sizes() {
        let mut puzzle = Puzzle::new();
        puzzle.assign_size((10, 10)).unwrap();
        assert!(EachRowAndColumnIsPermutation.apply(&mut puzzle).is_err());
    }
}
