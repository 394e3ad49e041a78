//! Constraints that establish the puzzle's alphabet.

use std::fmt;

use tracing::debug;

use crate::{
    error::{PuzzleError, Result},
    solver::{constraint::Constraint, puzzle::Puzzle, symbols::SymbolSet},
};

/// Sets the alphabet to the numeric digits `"1"` through `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolsAreDigits {
    max: usize,
}

impl SymbolsAreDigits {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn symbols(&self) -> SymbolSet {
        (1..=self.max).map(|digit| digit.to_string()).collect()
    }

    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        let symbols = self.symbols();
        debug!(%symbols, "setting alphabet to digits");
        puzzle.assign_symbols(symbols)?;
        Ok(vec![])
    }
}

impl Default for SymbolsAreDigits {
    fn default() -> Self {
        Self { max: 9 }
    }
}

impl fmt::Display for SymbolsAreDigits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolsAreDigits: 1-{}", self.max)
    }
}

/// Sets the alphabet to digits up to the puzzle's diameter. The puzzle must
/// be square; until the size is known this defers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolsAreDigitsByDiameter;

impl SymbolsAreDigitsByDiameter {
    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        match puzzle.size {
            Some((rows, cols)) if rows == cols => {
                Ok(vec![SymbolsAreDigits::new(rows).into()])
            }
            Some((rows, cols)) => Err(PuzzleError::NotSquare(rows, cols).into()),
            None => Ok(vec![(*self).into()]),
        }
    }
}

impl fmt::Display for SymbolsAreDigitsByDiameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolsAreDigitsByDiameter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_set_the_alphabet_and_finish() {
        let mut puzzle = Puzzle::new();
        let replacements = SymbolsAreDigits::new(3).apply(&mut puzzle).unwrap();
        assert!(replacements.is_empty());
        assert_eq!(
            puzzle.symbols,
            Some(["1", "2", "3"].iter().copied().collect())
        );
    }

    #[test]
    fn by_diameter_defers_until_the_size_is_known() {
        let mut puzzle = Puzzle::new();
        let constraint = SymbolsAreDigitsByDiameter;
        let deferred = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(deferred, vec![constraint.into()]);

        puzzle.assign_size((4, 4)).unwrap();
        let replacements = constraint.apply(&mut puzzle).unwrap();
        assert_eq!(replacements, vec![SymbolsAreDigits::new(4).into()]);
    }

    #[test]
    fn by_diameter_rejects_oblong_puzzles() {
        let mut puzzle = Puzzle::new();
        puzzle.assign_size((2, 3)).unwrap();
        assert!(SymbolsAreDigitsByDiameter.apply(&mut puzzle).is_err());
    }
}
