//! The candidate state of a puzzle grid: one symbol set per cell, with
//! change tracking and a pre-commit change hook.

use std::{fmt, rc::Rc, str::FromStr};

use im::Vector;
use itertools::Itertools;

use crate::{
    error::{Error, PuzzleError, Result},
    solver::{
        coords::{Coord, Region},
        symbols::{Symbol, SymbolSet},
    },
};

/// Fired by [`Grid::set_cell`] before a mutation commits, with the grid in
/// its pre-mutation state plus the location, old, and new cell values.
pub type ChangeHook = Rc<dyn Fn(&Grid, Coord, &Cell, &Cell)>;

/// The contents of one grid cell.
///
/// `Uninitialized` means the alphabet has not yet been projected onto the
/// cell (written `*` in grid text). A `Candidates` set of size one is a
/// determined cell; an empty set witnesses unsatisfiability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Uninitialized,
    Candidates(SymbolSet),
}

impl Cell {
    pub fn singleton(symbol: impl Into<Symbol>) -> Cell {
        Cell::Candidates(SymbolSet::singleton(symbol))
    }

    pub fn from_char(ch: char) -> Cell {
        if ch == '*' {
            Cell::Uninitialized
        } else {
            Cell::singleton(ch.to_string())
        }
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self, Cell::Uninitialized)
    }

    /// The sole candidate, if this cell is determined.
    pub fn settled(&self) -> Option<&Symbol> {
        match self {
            Cell::Candidates(set) if set.len() == 1 => set.value(),
            _ => None,
        }
    }

    pub fn candidates(&self) -> Option<&SymbolSet> {
        match self {
            Cell::Candidates(set) => Some(set),
            Cell::Uninitialized => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Uninitialized => write!(f, "*"),
            Cell::Candidates(set) if set.is_empty() => write!(f, "_"),
            Cell::Candidates(set) if set.len() == 1 => {
                write!(f, "{}", set.value().unwrap())
            }
            Cell::Candidates(set) => write!(f, "{set}"),
        }
    }
}

/// A rectangular grid of candidate cells.
///
/// Rows are persistent vectors, so cloning a grid for a search branch is
/// cheap and the branch's mutations never leak back.
#[derive(Clone)]
pub struct Grid {
    cells: Vector<Vector<Cell>>,
    dirty: bool,
    on_change: Option<ChangeHook>,
}

impl Grid {
    /// A `rows x cols` grid with every cell uninitialized.
    pub fn uninitialized(rows: usize, cols: usize) -> Grid {
        let row: Vector<Cell> = std::iter::repeat(Cell::Uninitialized).take(cols).collect();
        Grid {
            cells: std::iter::repeat(row).take(rows).collect(),
            dirty: false,
            on_change: None,
        }
    }

    /// Parses a newline-separated block of single-character cells, `*`
    /// meaning uninitialized. Rows are trimmed; blank lines are skipped.
    pub fn parse(text: &str) -> Result<Grid> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(&rows)
    }

    /// Builds a grid from one string per row, one character per cell.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Grid> {
        let cells: Vec<Vec<Cell>> = rows
            .iter()
            .map(|row| row.as_ref().trim().chars().map(Cell::from_char).collect())
            .collect();
        Self::from_cells(cells)
    }

    /// Builds a grid from explicit cell values.
    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Result<Grid> {
        if cells.is_empty() || cells[0].is_empty() {
            return Err(PuzzleError::BadGrid("no cells".to_string()).into());
        }
        let cols = cells[0].len();
        if cells.iter().any(|row| row.len() != cols) {
            return Err(PuzzleError::BadGrid("ragged rows".to_string()).into());
        }
        Ok(Grid {
            cells: cells.into_iter().map(Vector::from).collect(),
            dirty: false,
            on_change: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    pub fn size(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn set_change_hook(&mut self, hook: ChangeHook) {
        self.on_change = Some(hook);
    }

    /// The candidate set at `loc`.
    pub fn at(&self, loc: Coord) -> &Cell {
        &self.cells[loc.row][loc.col]
    }

    /// Iterates every cell with its coordinate, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (Coord::new(row, col), cell))
        })
    }

    /// Replaces the cell at `loc`. When the contents actually change, the
    /// change hook fires first, then the mutation commits and the dirty
    /// flag is set. Returns whether anything changed.
    pub fn set_cell(&mut self, loc: Coord, contents: Cell) -> bool {
        let old = self.cells[loc.row][loc.col].clone();
        if old == contents {
            return false;
        }
        if let Some(hook) = self.on_change.clone() {
            hook(self, loc, &old, &contents);
        }
        self.cells.get_mut(loc.row).unwrap().set(loc.col, contents);
        self.dirty = true;
        true
    }

    /// Removes `bad` from the candidates at `loc`. Elimination is
    /// meaningless before the alphabet has reached the cell, so an
    /// uninitialized cell is an error.
    pub fn eliminate_at(&mut self, loc: Coord, bad: &SymbolSet) -> Result<bool> {
        let cell = self.at(loc).clone();
        match cell {
            Cell::Uninitialized => Err(PuzzleError::EliminateUninitialized(loc).into()),
            Cell::Candidates(set) => {
                let remaining = set.difference(bad);
                if remaining == set {
                    Ok(false)
                } else {
                    Ok(self.set_cell(loc, Cell::Candidates(remaining)))
                }
            }
        }
    }

    /// Applies [`Grid::eliminate_at`] across a region, returning the
    /// coordinates that actually changed.
    pub fn eliminate_throughout(
        &mut self,
        region: &Region,
        bad: &SymbolSet,
    ) -> Result<Vec<Coord>> {
        let mut changed = Vec::new();
        for loc in region.iter() {
            if self.eliminate_at(loc, bad)? {
                changed.push(loc);
            }
        }
        Ok(changed)
    }

    /// Narrows the cell at `loc` to candidates within `allowed`. An
    /// uninitialized cell becomes exactly `allowed` (its first
    /// initialization). Returns whether anything changed.
    pub fn intersect_at(&mut self, loc: Coord, allowed: &SymbolSet) -> bool {
        let cell = self.at(loc).clone();
        match cell {
            Cell::Uninitialized => self.set_cell(loc, Cell::Candidates(allowed.clone())),
            Cell::Candidates(set) => {
                let narrowed = set.intersection(allowed);
                if narrowed == set {
                    false
                } else {
                    self.set_cell(loc, Cell::Candidates(narrowed))
                }
            }
        }
    }

    /// Applies [`Grid::intersect_at`] across a region, returning the
    /// coordinates that actually changed.
    pub fn intersect_throughout(&mut self, region: &Region, allowed: &SymbolSet) -> Vec<Coord> {
        region
            .iter()
            .filter(|&loc| self.intersect_at(loc, allowed))
            .collect()
    }

    /// A reverse index from each candidate symbol to the coordinates within
    /// `region` where it occurs. Iteration order is insertion order.
    pub fn index_symbols_in(&self, region: &Region) -> Vec<(Symbol, Vec<Coord>)> {
        let mut index: Vec<(Symbol, Vec<Coord>)> = Vec::new();
        for loc in region.iter() {
            if let Cell::Candidates(set) = self.at(loc) {
                for symbol in set.iter() {
                    match index.iter_mut().find(|(s, _)| s == symbol) {
                        Some((_, locs)) => locs.push(loc),
                        None => index.push((symbol.clone(), vec![loc])),
                    }
                }
            }
        }
        index
    }

    pub fn is_initialized_at(&self, loc: Coord) -> bool {
        self.at(loc).is_initialized()
    }

    pub fn is_initialized_throughout(&self, region: &Region) -> bool {
        region.iter().all(|loc| self.is_initialized_at(loc))
    }

    /// True iff every cell is determined.
    pub fn is_solved(&self) -> bool {
        self.iter().all(|(_, cell)| cell.settled().is_some())
    }

    /// True iff some cell has no candidates left.
    pub fn is_unsolvable(&self) -> bool {
        self.iter()
            .any(|(_, cell)| matches!(cell, Cell::Candidates(set) if set.is_empty()))
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("cells", &self.cells)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Grid::parse(s)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).join(" "))
            .join("\n  ");
        write!(f, "[ {lines} ]")
    }
}
