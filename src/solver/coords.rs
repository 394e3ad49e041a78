//! Integer cell coordinates and regions: the scopes that constraints act on.

use std::fmt;

use crate::{error::Result, solver::chess};

/// A cell position as a `(row, col)` pair of zero-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", chess::location(*self))
    }
}

/// An ordered sequence of distinct coordinates, immutable once constructed.
///
/// Iteration follows construction order; equality ignores it, comparing the
/// cells as an unordered collection.
#[derive(Debug, Clone, Eq)]
pub struct Region {
    cells: Vec<Coord>,
}

impl Region {
    /// Builds a region from coordinates, dropping repeats while keeping the
    /// first occurrence's position.
    pub fn new(cells: Vec<Coord>) -> Self {
        let mut distinct = Vec::with_capacity(cells.len());
        for cell in cells {
            if !distinct.contains(&cell) {
                distinct.push(cell);
            }
        }
        Self { cells: distinct }
    }

    /// Parses a chess-notation coordinate list, e.g. `a1, b1-b2 c2`.
    pub fn parse(list: &str) -> Result<Self> {
        Ok(Self::new(chess::parse_list(list)?))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn first(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    pub fn is_subset(&self, other: &Region) -> bool {
        self.cells.iter().all(|c| other.contains(*c))
    }

    pub fn is_proper_subset(&self, other: &Region) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    /// The cells of `self` that also lie in `other`, in `self`'s order.
    pub fn intersect(&self, other: &Region) -> Region {
        Region::new(
            self.cells
                .iter()
                .copied()
                .filter(|c| other.contains(*c))
                .collect(),
        )
    }

    /// The cells of `self` not named in `removed`, in `self`'s order.
    pub fn subtract(&self, removed: &[Coord]) -> Region {
        Region::new(
            self.cells
                .iter()
                .copied()
                .filter(|c| !removed.contains(c))
                .collect(),
        )
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        if self.cells.len() != other.cells.len() {
            return false;
        }
        let mut lhs = self.cells.clone();
        let mut rhs = other.cells.clone();
        lhs.sort();
        rhs.sort();
        lhs == rhs
    }
}

impl FromIterator<Coord> for Region {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Region::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", chess::locations(&self.cells))
    }
}
