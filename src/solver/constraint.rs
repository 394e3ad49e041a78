//! The uniform constraint contract: a closed tagged union whose `apply`
//! returns the constraints that should replace it.

use std::fmt;

use crate::{
    error::Result,
    solver::{
        constraints::{
            coverage::AllCellsMustBeCovered,
            digits::{SymbolsAreDigits, SymbolsAreDigitsByDiameter},
            math_op::MathOp,
            permutation::{
                EachRowAndColumnIsPermutation, RegionIsCompletePermutation,
                RegionPermutesSymbols, RegionsAreCompletePermutation,
            },
            region_symbols::RegionSymbols,
            symbol_lists::RegionSymbolLists,
        },
        puzzle::Puzzle,
    },
};

/// One live constraint of a puzzle. The taxonomy is closed: dispatch is by
/// tag, and there is no open extension point.
///
/// `apply` follows the replacement protocol: an empty list retires the
/// constraint, a list containing an equal constraint keeps it (any other
/// members are additions), and any other non-empty list replaces it.
/// Deferral is returning a list with the constraint itself, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    SymbolsAreDigits(SymbolsAreDigits),
    SymbolsAreDigitsByDiameter(SymbolsAreDigitsByDiameter),
    RegionPermutesSymbols(RegionPermutesSymbols),
    RegionIsCompletePermutation(RegionIsCompletePermutation),
    RegionsAreCompletePermutation(RegionsAreCompletePermutation),
    EachRowAndColumnIsPermutation(EachRowAndColumnIsPermutation),
    MathOp(MathOp),
    RegionSymbols(RegionSymbols),
    RegionSymbolLists(RegionSymbolLists),
    AllCellsMustBeCovered(AllCellsMustBeCovered),
}

impl Constraint {
    /// Applies this constraint to the puzzle, returning its replacements.
    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        match self {
            Constraint::SymbolsAreDigits(c) => c.apply(puzzle),
            Constraint::SymbolsAreDigitsByDiameter(c) => c.apply(puzzle),
            Constraint::RegionPermutesSymbols(c) => c.apply(puzzle),
            Constraint::RegionIsCompletePermutation(c) => c.apply(puzzle),
            Constraint::RegionsAreCompletePermutation(c) => c.apply(puzzle),
            Constraint::EachRowAndColumnIsPermutation(c) => c.apply(puzzle),
            Constraint::MathOp(c) => c.apply(puzzle),
            Constraint::RegionSymbols(c) => c.apply(puzzle),
            Constraint::RegionSymbolLists(c) => c.apply(puzzle),
            Constraint::AllCellsMustBeCovered(c) => c.apply(puzzle),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::SymbolsAreDigits(c) => c.fmt(f),
            Constraint::SymbolsAreDigitsByDiameter(c) => c.fmt(f),
            Constraint::RegionPermutesSymbols(c) => c.fmt(f),
            Constraint::RegionIsCompletePermutation(c) => c.fmt(f),
            Constraint::RegionsAreCompletePermutation(c) => c.fmt(f),
            Constraint::EachRowAndColumnIsPermutation(c) => c.fmt(f),
            Constraint::MathOp(c) => c.fmt(f),
            Constraint::RegionSymbols(c) => c.fmt(f),
            Constraint::RegionSymbolLists(c) => c.fmt(f),
            Constraint::AllCellsMustBeCovered(c) => c.fmt(f),
        }
    }
}

impl From<SymbolsAreDigits> for Constraint {
    fn from(c: SymbolsAreDigits) -> Self {
        Constraint::SymbolsAreDigits(c)
    }
}

impl From<SymbolsAreDigitsByDiameter> for Constraint {
    fn from(c: SymbolsAreDigitsByDiameter) -> Self {
        Constraint::SymbolsAreDigitsByDiameter(c)
    }
}

impl From<RegionPermutesSymbols> for Constraint {
    fn from(c: RegionPermutesSymbols) -> Self {
        Constraint::RegionPermutesSymbols(c)
    }
}

impl From<RegionIsCompletePermutation> for Constraint {
    fn from(c: RegionIsCompletePermutation) -> Self {
        Constraint::RegionIsCompletePermutation(c)
    }
}

impl From<RegionsAreCompletePermutation> for Constraint {
    fn from(c: RegionsAreCompletePermutation) -> Self {
        Constraint::RegionsAreCompletePermutation(c)
    }
}

impl From<EachRowAndColumnIsPermutation> for Constraint {
    fn from(c: EachRowAndColumnIsPermutation) -> Self {
        Constraint::EachRowAndColumnIsPermutation(c)
    }
}

impl From<MathOp> for Constraint {
    fn from(c: MathOp) -> Self {
        Constraint::MathOp(c)
    }
}

impl From<RegionSymbols> for Constraint {
    fn from(c: RegionSymbols) -> Self {
        Constraint::RegionSymbols(c)
    }
}

impl From<RegionSymbolLists> for Constraint {
    fn from(c: RegionSymbolLists) -> Self {
        Constraint::RegionSymbolLists(c)
    }
}

impl From<AllCellsMustBeCovered> for Constraint {
    fn from(c: AllCellsMustBeCovered) -> Self {
        Constraint::AllCellsMustBeCovered(c)
    }
}
