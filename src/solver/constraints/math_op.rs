//! Arithmetic cages: a region whose cell values must combine under an
//! integer operator to reach a target.

use std::fmt;

use tracing::debug;

use crate::{
    error::{PuzzleError, Result},
    solver::{
        chess,
        constraint::Constraint,
        constraints::{region_symbols::RegionSymbols, symbol_lists::RegionSymbolLists},
        coords::{Coord, Region},
        factoring::factorizations,
        grid::Cell,
        puzzle::Puzzle,
        symbols::{SymbolList, SymbolSet},
    },
};

/// The operator of an arithmetic cage. All arithmetic is over integers;
/// division that does not come out even yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathKind {
    Sum,
    Difference,
    Product,
    Quotient,
}

impl MathKind {
    pub fn glyph(&self) -> char {
        match self {
            MathKind::Sum => '+',
            MathKind::Difference => '-',
            MathKind::Product => '*',
            MathKind::Quotient => '/',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<MathKind> {
        match glyph {
            '+' => Some(MathKind::Sum),
            '-' => Some(MathKind::Difference),
            '*' | 'x' => Some(MathKind::Product),
            '/' | '÷' => Some(MathKind::Quotient),
            _ => None,
        }
    }

    pub fn is_commutative(&self) -> bool {
        matches!(self, MathKind::Sum | MathKind::Product)
    }

    /// The commutative operator that accumulates a cage's non-leading
    /// operands: addition for difference cages, multiplication for
    /// quotient cages.
    pub fn companion(&self) -> MathKind {
        match self {
            MathKind::Sum | MathKind::Difference => MathKind::Sum,
            MathKind::Product | MathKind::Quotient => MathKind::Product,
        }
    }

    /// `x op y`, or nothing when the result is not an integer.
    pub fn apply(&self, x: i64, y: i64) -> Option<i64> {
        match self {
            MathKind::Sum => Some(x + y),
            MathKind::Difference => Some(x - y),
            MathKind::Product => Some(x * y),
            MathKind::Quotient => {
                if y != 0 && x % y == 0 {
                    Some(x / y)
                } else {
                    None
                }
            }
        }
    }

    /// The inverse operator applied as `target inv known`: the value the
    /// rest of a cage must reach once `known` is accounted for.
    pub fn invert(&self, target: i64, known: i64) -> Option<i64> {
        match self {
            MathKind::Sum => Some(target - known),
            MathKind::Difference => Some(target + known),
            MathKind::Product => {
                if known != 0 && target % known == 0 {
                    Some(target / known)
                } else {
                    None
                }
            }
            MathKind::Quotient => Some(target * known),
        }
    }
}

/// An arithmetic cage over a region.
///
/// For non-commutative operators the cage admits the operands in any
/// order: one cell leads the operator and the rest accumulate under the
/// companion operator. A two-cell difference cage with target `t` thus
/// accepts both `a-b = t` and `b-a = t`, and a larger one reads as one
/// cell minus (or divided by) the combined rest.
#[derive(Debug, Clone, PartialEq)]
pub struct MathOp {
    region: Region,
    kind: MathKind,
    target: i64,
    factored: bool,
}

impl MathOp {
    pub fn new(region: Region, kind: MathKind, target: i64) -> Self {
        Self {
            region,
            kind,
            target,
            factored: false,
        }
    }

    pub fn sum(region: Region, target: i64) -> Self {
        Self::new(region, MathKind::Sum, target)
    }

    pub fn difference(region: Region, target: i64) -> Self {
        Self::new(region, MathKind::Difference, target)
    }

    pub fn product(region: Region, target: i64) -> Self {
        Self::new(region, MathKind::Product, target)
    }

    pub fn quotient(region: Region, target: i64) -> Self {
        Self::new(region, MathKind::Quotient, target)
    }

    /// Parses a free-form cage expression such as `a1+a2+a3=6`. Cells are
    /// single squares joined by one operator glyph; an operator-less
    /// expression like `a1=5` is a single-cell sum.
    pub fn parse(expression: &str) -> Result<MathOp> {
        let bad = || PuzzleError::BadExpression(expression.to_string());

        let Some((lhs, rhs)) = expression.split_once('=') else {
            return Err(bad().into());
        };
        let target: i64 = rhs.trim().parse().map_err(|_| bad())?;

        let mut kind: Option<MathKind> = None;
        let mut squares = Vec::new();
        let mut current = String::new();
        for ch in lhs.trim().chars() {
            if let Some(found) = MathKind::from_glyph(ch) {
                match kind {
                    Some(existing) if existing != found => return Err(bad().into()),
                    _ => kind = Some(found),
                }
                squares.push(std::mem::take(&mut current));
            } else if !ch.is_whitespace() {
                current.push(ch);
            }
        }
        squares.push(current);

        let mut cells = Vec::with_capacity(squares.len());
        for square in &squares {
            if square.is_empty() {
                return Err(bad().into());
            }
            cells.push(chess::parse_square(square)?);
        }
        Ok(MathOp::new(
            Region::new(cells),
            kind.unwrap_or(MathKind::Sum),
            target,
        ))
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn kind(&self) -> MathKind {
        self.kind
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn apply(&self, puzzle: &mut Puzzle) -> Result<Vec<Constraint>> {
        if !puzzle.is_ready() {
            return Ok(vec![self.clone().into()]);
        }
        if let Some(result) = self.empty(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.single_value(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.remove_known(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.two_cell_operator(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.region_operator(puzzle)? {
            return Ok(result);
        }
        if let Some(result) = self.prime_factors(puzzle)? {
            return Ok(result);
        }
        Ok(vec![self.clone().into()])
    }

    /// The sorted integer values of the alphabet.
    fn alphabet_values(puzzle: &Puzzle) -> Vec<i64> {
        let mut values: Vec<i64> = puzzle
            .symbols
            .as_ref()
            .unwrap()
            .iter()
            .filter_map(|symbol| symbol.parse().ok())
            .collect();
        values.sort_unstable();
        values
    }

    /// The values a cage partner may hold when this cage's other cell holds
    /// `known`: the inverse of the target, plus the other operand order for
    /// non-commutative operators. Only integral partners survive.
    fn partner_values(&self, known: i64, alphabet: &[i64]) -> Vec<i64> {
        let mut partners = Vec::with_capacity(2);
        if let Some(value) = self.kind.invert(self.target, known) {
            partners.push(value);
        }
        if !self.kind.is_commutative() {
            if let Some(value) = self.kind.apply(known, self.target) {
                if !partners.contains(&value) {
                    partners.push(value);
                }
            }
        }
        partners.retain(|value| alphabet.contains(value));
        partners
    }

    /// The integer candidates at a coordinate.
    fn values_at(puzzle: &Puzzle, coord: Coord) -> Vec<i64> {
        match puzzle.solution.as_ref().unwrap().at(coord) {
            Cell::Candidates(set) => set.iter().filter_map(|s| s.parse().ok()).collect(),
            Cell::Uninitialized => vec![],
        }
    }

    /// Whether some assignment of the cells can reach `target`. A
    /// commutative cage folds its operator across the cells; a
    /// non-commutative cage lets any one cell lead the operator while the
    /// rest accumulate under the companion operator.
    fn admits(&self, cells: &[Vec<i64>], target: i64) -> bool {
        match cells {
            [] => false,
            [last] => last.contains(&target),
            [first, rest @ ..] => first.iter().any(|&value| {
                if self
                    .kind
                    .invert(target, value)
                    .is_some_and(|remaining| self.admits(rest, remaining))
                {
                    return true;
                }
                !self.kind.is_commutative()
                    && self.kind.apply(value, target).is_some_and(|residue| {
                        Self::accumulates(self.kind.companion(), rest, residue)
                    })
            }),
        }
    }

    /// Whether some assignment of the cells combines to `target` under a
    /// commutative operator.
    fn accumulates(kind: MathKind, cells: &[Vec<i64>], target: i64) -> bool {
        match cells {
            [] => false,
            [last] => last.contains(&target),
            [first, rest @ ..] => first.iter().any(|&value| {
                kind.invert(target, value)
                    .is_some_and(|remaining| Self::accumulates(kind, rest, remaining))
            }),
        }
    }

    fn empty(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.region.is_empty() {
            puzzle.log_technique("empty");
            return Ok(Some(vec![]));
        }
        Ok(None)
    }

    /// A single-cell commutative cage just states the cell's value.
    fn single_value(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.region.len() != 1 || !self.kind.is_commutative() {
            return Ok(None);
        }
        let cell = self.region.first().unwrap();
        let symbol = self.target.to_string();
        let allowed = if puzzle.symbols.as_ref().unwrap().contains(&symbol) {
            SymbolSet::singleton(symbol)
        } else {
            SymbolSet::new()
        };
        debug!(value = self.target, %cell, "cage has one cell");
        let grid = puzzle.solution.as_mut().unwrap();
        grid.intersect_at(cell, &allowed);
        puzzle.log_technique("singleValue");
        Ok(Some(vec![]))
    }

    /// Once a caged cell is determined, fold its value into the target and
    /// carry on with a smaller cage.
    fn remove_known(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let Some((coord, known)) = self.region.iter().find_map(|coord| {
            let grid = puzzle.solution.as_ref().unwrap();
            let value: Option<i64> = grid.at(coord).settled().and_then(|s| s.parse().ok());
            value.map(|v| (coord, v))
        }) else {
            return Ok(None);
        };

        let alphabet = Self::alphabet_values(puzzle);
        let partners = self.partner_values(known, &alphabet);
        let rest = self.region.subtract(&[coord]);
        debug!(%coord, known, ?partners, "folding a determined cell into the cage");

        if partners.len() == 1 && self.kind.is_commutative() {
            puzzle.log_technique("removeKnown");
            return Ok(Some(vec![
                MathOp::new(rest, self.kind, partners[0]).into(),
            ]));
        }
        if self.region.len() == 2 {
            // The surviving partners bound the remaining cell; none at all
            // leaves it empty, witnessing infeasibility.
            let symbols: SymbolSet = partners.iter().map(|v| v.to_string()).collect();
            puzzle.log_technique("removeKnown");
            return Ok(Some(vec![RegionSymbols::new(rest, symbols).into()]));
        }
        if !self.kind.is_commutative() {
            return self.remove_known_roles(puzzle, known, rest);
        }
        Ok(None)
    }

    /// A determined cell of a larger non-commutative cage plays one of two
    /// roles: it leads the operator, leaving the rest to accumulate to its
    /// residue under the companion operator, or it joins the accumulated
    /// side, leaving a smaller cage of the same kind. When only one role is
    /// possible the cage rewrites accordingly; when both are open no single
    /// constraint captures the disjunction and the cage stays whole.
    fn remove_known_roles(
        &self,
        puzzle: &mut Puzzle,
        known: i64,
        rest: Region,
    ) -> Result<Option<Vec<Constraint>>> {
        let grid = puzzle.solution.as_ref().unwrap();
        if !grid.is_initialized_throughout(&rest) {
            return Ok(None);
        }
        let rest_values: Vec<Vec<i64>> = rest
            .iter()
            .map(|coord| Self::values_at(puzzle, coord))
            .collect();

        let leading = self
            .kind
            .apply(known, self.target)
            .filter(|&residue| Self::accumulates(self.kind.companion(), &rest_values, residue));
        let accumulated = self
            .kind
            .invert(self.target, known)
            .filter(|&residue| self.admits(&rest_values, residue));

        match (leading, accumulated) {
            (Some(residue), None) => {
                puzzle.log_technique("removeKnown");
                Ok(Some(vec![
                    MathOp::new(rest, self.kind.companion(), residue).into(),
                ]))
            }
            (None, Some(residue)) => {
                puzzle.log_technique("removeKnown");
                Ok(Some(vec![MathOp::new(rest, self.kind, residue).into()]))
            }
            _ => Ok(None),
        }
    }

    /// In a two-cell cage, a candidate with no partner on the other side is
    /// impossible.
    fn two_cell_operator(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.region.len() != 2 {
            return Ok(None);
        }
        let grid = puzzle.solution.as_ref().unwrap();
        if !grid.is_initialized_throughout(&self.region) {
            return Ok(None);
        }

        let alphabet = Self::alphabet_values(puzzle);
        let cells = [self.region.cells()[0], self.region.cells()[1]];
        let mut changed = false;
        for (this, other) in [(0, 1), (1, 0)] {
            let other_values = Self::values_at(puzzle, cells[other]);
            let mut impossible = SymbolSet::new();
            for value in Self::values_at(puzzle, cells[this]) {
                let partners = self.partner_values(value, &alphabet);
                if !partners.iter().any(|p| other_values.contains(p)) {
                    impossible.insert(value.to_string());
                }
            }
            if !impossible.is_empty() {
                let grid = puzzle.solution.as_mut().unwrap();
                if !grid.eliminate_throughout(&Region::new(vec![cells[this]]), &impossible)?
                    .is_empty()
                {
                    changed = true;
                }
            }
        }
        if changed {
            puzzle.log_technique("twoCellOperator");
        }
        Ok(None)
    }

    /// In a cage of any size, a candidate is impossible when no assignment
    /// of the remaining cells reaches the target with it. The recursion is
    /// exponential in the cage size, which stays small in practice.
    fn region_operator(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        let grid = puzzle.solution.as_ref().unwrap();
        if !grid.is_initialized_throughout(&self.region) {
            return Ok(None);
        }

        let all_values: Vec<Vec<i64>> = self
            .region
            .iter()
            .map(|coord| Self::values_at(puzzle, coord))
            .collect();

        let mut changed = false;
        for (position, coord) in self.region.iter().enumerate() {
            let rest: Vec<Vec<i64>> = all_values
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != position)
                .map(|(_, values)| values.clone())
                .collect();
            let mut impossible = SymbolSet::new();
            for &value in &all_values[position] {
                let mut cells = Vec::with_capacity(rest.len() + 1);
                cells.push(vec![value]);
                cells.extend(rest.iter().cloned());
                if !self.admits(&cells, self.target) {
                    impossible.insert(value.to_string());
                }
            }
            if !impossible.is_empty() {
                let grid = puzzle.solution.as_mut().unwrap();
                if !grid
                    .eliminate_throughout(&Region::new(vec![coord]), &impossible)?
                    .is_empty()
                {
                    changed = true;
                }
            }
        }
        if changed {
            puzzle.log_technique("regionOperator");
        }
        Ok(None)
    }

    /// A product cage factors its target once, handing the possible factor
    /// multisets to a symbol-list constraint.
    fn prime_factors(&self, puzzle: &mut Puzzle) -> Result<Option<Vec<Constraint>>> {
        if self.kind != MathKind::Product || self.factored {
            return Ok(None);
        }
        let alphabet = Self::alphabet_values(puzzle);
        let combos = factorizations(self.target, self.region.len(), &alphabet);
        debug!(value = self.target, count = combos.len(), "factoring the cage target");
        puzzle.log_technique("primeFactors");

        if combos.is_empty() {
            // No factorization fits the alphabet; the cage is infeasible.
            let grid = puzzle.solution.as_mut().unwrap();
            grid.intersect_throughout(&self.region, &SymbolSet::new());
            return Ok(Some(vec![]));
        }

        let lists: Vec<SymbolList> = combos
            .into_iter()
            .map(|combo| combo.into_iter().map(|v| v.to_string()).collect())
            .collect();
        let mut factored = self.clone();
        factored.factored = true;
        Ok(Some(vec![
            factored.into(),
            RegionSymbolLists::new(self.region.clone(), lists)?.into(),
        ]))
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MathOp: {} {} = {}",
            self.region,
            self.kind.glyph(),
            self.target
        )
    }
}
