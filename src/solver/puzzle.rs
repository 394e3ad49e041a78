//! The puzzle driver: holds the grid, alphabet, and live constraints, runs
//! the propagation fixed point, and falls back to depth-first search.

use std::{collections::BTreeMap, fmt, rc::Rc};

use tracing::debug;

use crate::{
    error::{PuzzleError, Result},
    solver::{
        constraint::Constraint,
        coords::Coord,
        grid::{Cell, ChangeHook, Grid},
        stats::SolveStats,
        symbols::{Symbol, SymbolSet},
    },
};

/// Fired with each technique name as it is logged.
pub type TechniqueHook = Rc<dyn Fn(&str)>;

/// A puzzle under solution.
///
/// A puzzle begins with none of size, alphabet, or grid set; constraints
/// may supply any of them on first apply, and re-assignment fails if a
/// second value disagrees. Solving mutates the solution grid in place; the
/// pristine initial grid is kept alongside.
#[derive(Clone)]
pub struct Puzzle {
    pub size: Option<(usize, usize)>,
    pub symbols: Option<SymbolSet>,
    pub initial: Option<Grid>,
    pub solution: Option<Grid>,
    pub constraints: Vec<Constraint>,
    pub stats: SolveStats,
    technique_hook: Option<TechniqueHook>,
    solution_hook: Option<ChangeHook>,
}

impl Puzzle {
    pub fn new() -> Self {
        Self {
            size: None,
            symbols: None,
            initial: None,
            solution: None,
            constraints: Vec::new(),
            stats: SolveStats::default(),
            technique_hook: None,
            solution_hook: None,
        }
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Establishes the grid size; a disagreeing second assignment fails.
    pub fn assign_size(&mut self, size: (usize, usize)) -> Result<()> {
        match self.size {
            Some(existing) if existing != size => Err(PuzzleError::ConflictingSize(
                existing.0, existing.1, size.0, size.1,
            )
            .into()),
            _ => {
                self.size = Some(size);
                Ok(())
            }
        }
    }

    /// Establishes the alphabet; a disagreeing second assignment fails.
    pub fn assign_symbols(&mut self, symbols: SymbolSet) -> Result<()> {
        match &self.symbols {
            Some(existing) if *existing != symbols => Err(PuzzleError::ConflictingSymbols(
                existing.to_string(),
                symbols.to_string(),
            )
            .into()),
            _ => {
                self.symbols = Some(symbols);
                Ok(())
            }
        }
    }

    /// Establishes the initial grid and, through it, the working solution
    /// grid and the size.
    pub fn assign_initial(&mut self, grid: Grid) -> Result<()> {
        match &self.initial {
            Some(existing) if *existing != grid => {
                return Err(PuzzleError::ConflictingGrid.into())
            }
            _ => {}
        }
        self.initial = Some(grid.clone());
        self.assign_solution(grid)
    }

    /// Establishes the working solution grid, deriving the size and wiring
    /// the solution-changed hook into the grid.
    pub fn assign_solution(&mut self, mut grid: Grid) -> Result<()> {
        match &self.solution {
            Some(existing) if *existing != grid => {
                return Err(PuzzleError::ConflictingGrid.into())
            }
            Some(_) => return Ok(()),
            None => {}
        }
        self.assign_size(grid.size())?;
        if let Some(hook) = &self.solution_hook {
            grid.set_change_hook(hook.clone());
        }
        self.solution = Some(grid);
        Ok(())
    }

    /// Registers a callback fired for every technique as it is logged.
    pub fn set_technique_hook(&mut self, hook: TechniqueHook) {
        self.technique_hook = Some(hook);
    }

    /// Registers a callback fired before each solution-cell change commits.
    pub fn set_solution_hook(&mut self, hook: ChangeHook) {
        if let Some(grid) = self.solution.as_mut() {
            grid.set_change_hook(hook.clone());
        }
        self.solution_hook = Some(hook);
    }

    /// Counts a technique firing and notifies the technique hook.
    pub fn log_technique(&mut self, name: &'static str) {
        debug!(technique = name, "fired");
        self.stats.record(name);
        if let Some(hook) = &self.technique_hook {
            hook(name);
        }
    }

    /// Whether the grid and alphabet are both available, which most
    /// techniques need before they can say anything.
    pub(crate) fn is_ready(&self) -> bool {
        self.solution.is_some() && self.symbols.is_some()
    }

    pub fn is_solved(&self) -> bool {
        self.solution.as_ref().is_some_and(Grid::is_solved)
    }

    pub fn is_unsolvable(&self) -> bool {
        self.solution.as_ref().is_some_and(Grid::is_unsolvable)
    }

    pub fn is_finished(&self) -> bool {
        self.is_solved() || self.is_unsolvable()
    }

    /// Projects the alphabet onto any still-uninitialized cells.
    pub(crate) fn expand_uninitialized(&mut self) {
        let (Some(symbols), Some(grid)) = (self.symbols.clone(), self.solution.as_mut()) else {
            return;
        };
        let bare: Vec<Coord> = grid
            .iter()
            .filter(|(_, cell)| !cell.is_initialized())
            .map(|(coord, _)| coord)
            .collect();
        if bare.is_empty() {
            return;
        }
        for coord in bare {
            grid.set_cell(coord, Cell::Candidates(symbols.clone()));
        }
        self.log_technique("expand");
    }

    /// One propagation pass: applies every live constraint once, in order,
    /// and rewrites the constraint list from their replacements. Returns
    /// whether the pass changed the grid or the constraint list.
    ///
    /// Within a pass, later constraints observe earlier constraints' cell
    /// mutations, but the constraint list itself only changes at the end,
    /// with replacements keeping their original position and additions
    /// following it.
    pub fn reduce_constraints(&mut self) -> Result<bool> {
        self.stats.passes += 1;
        if let Some(grid) = self.solution.as_mut() {
            grid.clear_dirty();
        }
        if self.size.is_some() {
            self.expand_uninitialized();
        }

        let snapshot = self.constraints.clone();
        let mut next = Vec::with_capacity(snapshot.len());
        let mut constraints_changed = false;
        for constraint in &snapshot {
            let replacements = constraint.apply(self)?;
            if replacements.len() != 1 || replacements[0] != *constraint {
                constraints_changed = true;
            }
            next.extend(replacements);
        }
        self.constraints = next;

        let dirty = self.solution.as_ref().is_some_and(Grid::is_dirty);
        debug!(
            pass = self.stats.passes,
            constraints_changed, dirty, "pass complete"
        );
        Ok(constraints_changed || dirty)
    }

    /// Runs propagation to quiescence, then search if the puzzle is still
    /// open. Returns whether the puzzle ended up solved; `false` with
    /// [`Puzzle::is_unsolvable`] clear means search exhausted every branch
    /// without a contradiction, which points at a solver gap rather than
    /// at the puzzle.
    pub fn solve(&mut self) -> Result<bool> {
        while self.reduce_constraints()? && !self.is_finished() {}
        if !self.is_finished() {
            self.search_solution_space()?;
        }
        Ok(self.is_solved())
    }

    /// Depth-first search over the stalled grid: pick the cell with the
    /// fewest remaining candidates and try each in turn on a copy.
    fn search_solution_space(&mut self) -> Result<bool> {
        if self.stats.first_passes.is_none() {
            self.stats.first_passes = Some(self.stats.passes);
        }
        self.stats.plies += 1;

        let Some(grid) = self.solution.as_ref() else {
            return Ok(false);
        };

        // For each candidate-set size, the last coordinate holding it; the
        // scan order makes the guess deterministic.
        let mut last_by_size: BTreeMap<usize, Coord> = BTreeMap::new();
        for (coord, cell) in grid.iter() {
            if let Cell::Candidates(set) = cell {
                if set.len() >= 2 {
                    last_by_size.insert(set.len(), coord);
                }
            }
        }
        let Some((_, &coord)) = last_by_size.iter().next() else {
            return Ok(false);
        };
        let candidates: Vec<Symbol> = match grid.at(coord) {
            Cell::Candidates(set) => set.iter().cloned().collect(),
            Cell::Uninitialized => return Ok(false),
        };

        for symbol in candidates {
            debug!(%coord, %symbol, ply = self.stats.plies, "guessing");
            let mut branch = self.clone();
            branch
                .solution
                .as_mut()
                .unwrap()
                .set_cell(coord, Cell::singleton(symbol));
            branch.log_technique("guess");

            let solved = branch.solve()?;
            if solved {
                self.solution = branch.solution;
                self.stats = branch.stats;
                return Ok(true);
            }
            // The branch failed, but its counters started from ours and
            // grew, so adopting them accumulates the work done.
            self.stats = branch.stats;
        }
        Ok(false)
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("size", &self.size)
            .field("symbols", &self.symbols)
            .field("solution", &self.solution)
            .field("constraints", &self.constraints)
            .field("stats", &self.stats)
            .finish()
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.solution {
            Some(grid) => grid.fmt(f),
            None => write!(f, "(no grid)"),
        }
    }
}
