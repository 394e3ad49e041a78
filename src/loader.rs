//! Configuration intake: JSON documents that establish a puzzle's size,
//! initial grid, and constraints, with hierarchical includes for the
//! predefined puzzle families.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{PuzzleError, Result},
    solver::{
        constraint::Constraint,
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
        coords::{Coord, Region},
        grid::Grid,
        puzzle::Puzzle,
        symbols::{SymbolList, SymbolSet},
    },
};

/// Puzzle families shipped with the crate, resolvable as includes by name.
const FAMILIES: &[(&str, &str)] = &[
    ("sudoku", include_str!("families/sudoku.json")),
    ("sudoku6", include_str!("families/sudoku6.json")),
    ("latin", include_str!("families/latin.json")),
    ("kenken", include_str!("families/kenken.json")),
];

enum Include {
    Family(&'static str),
    File(PathBuf),
}

/// Loads configuration documents into a [`Puzzle`].
///
/// A document is a JSON object with optional `dimensions` (a square size),
/// `size` (`[rows, cols]`), `initial` (a grid string or list of row
/// strings), and `constraints` keys. Constraint entries are dispatched as
/// described in the crate docs: bare names, cage expressions, includes,
/// `name`-keyed tables, or single-key initializer tables.
#[derive(Debug, Default)]
pub struct Loader {
    active_includes: Vec<String>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads one configuration file into the puzzle.
    pub fn load_file(&mut self, puzzle: &mut Puzzle, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "loading configuration");
        let text = std::fs::read_to_string(path)?;
        self.load_str(puzzle, &text, path.parent())
    }

    /// Loads a configuration document from text; `base` anchors relative
    /// includes.
    pub fn load_str(
        &mut self,
        puzzle: &mut Puzzle,
        text: &str,
        base: Option<&Path>,
    ) -> Result<()> {
        let document: Value = serde_json::from_str(text)?;
        self.load_value(puzzle, &document, base)
    }

    fn load_value(&mut self, puzzle: &mut Puzzle, document: &Value, base: Option<&Path>) -> Result<()> {
        let Some(table) = document.as_object() else {
            return Err(PuzzleError::Config("document must be an object".to_string()).into());
        };

        if let Some(value) = table.get("dimensions") {
            let side = usize_param(value, "dimensions")?;
            puzzle.assign_size((side, side))?;
        }
        if let Some(value) = table.get("size") {
            puzzle.assign_size(size_param(value)?)?;
        }
        if let Some(value) = table.get("initial") {
            puzzle.assign_initial(grid_param(value)?)?;
        }
        if let Some(value) = table.get("constraints") {
            let Some(entries) = value.as_array() else {
                return Err(
                    PuzzleError::Config("`constraints` must be a list".to_string()).into(),
                );
            };
            for entry in entries {
                self.constraint_entry(puzzle, entry, base)?;
            }
        }
        Ok(())
    }

    fn constraint_entry(
        &mut self,
        puzzle: &mut Puzzle,
        entry: &Value,
        base: Option<&Path>,
    ) -> Result<()> {
        match entry {
            Value::String(text) => {
                if text.contains('=') {
                    puzzle.add_constraint(MathOp::parse(text)?.into());
                    return Ok(());
                }
                if let Some(constraint) = named_without_parameters(text) {
                    puzzle.add_constraint(constraint);
                    return Ok(());
                }
                if let Some(include) = self.resolve_include(text, base) {
                    return self.include(puzzle, text, include);
                }
                Err(PuzzleError::UnknownConstraint(text.clone()).into())
            }
            Value::Object(table) => {
                if let Some(name) = table.get("name").and_then(Value::as_str) {
                    let constraint = named_with_table(name, table)?;
                    puzzle.add_constraint(constraint);
                    return Ok(());
                }
                if table.len() == 1 {
                    let (name, initializer) = table.iter().next().unwrap();
                    if name.starts_with(char::is_uppercase) {
                        let constraint = named_with_initializer(name, initializer)?;
                        puzzle.add_constraint(constraint);
                        return Ok(());
                    }
                }
                Err(PuzzleError::Config(format!("unrecognized constraint entry {entry}")).into())
            }
            _ => Err(PuzzleError::Config(format!("unrecognized constraint entry {entry}")).into()),
        }
    }

    fn resolve_include(&self, name: &str, base: Option<&Path>) -> Option<Include> {
        let lowered = name.to_lowercase();
        if let Some((_, text)) = FAMILIES.iter().find(|(family, _)| *family == lowered) {
            return Some(Include::Family(text));
        }
        for candidate in [name.to_string(), format!("{name}.json")] {
            let path = match base {
                Some(base) => base.join(&candidate),
                None => PathBuf::from(&candidate),
            };
            if path.is_file() {
                return Some(Include::File(path));
            }
        }
        None
    }

    fn include(&mut self, puzzle: &mut Puzzle, name: &str, include: Include) -> Result<()> {
        let key = name.to_lowercase();
        if self.active_includes.contains(&key) {
            return Err(PuzzleError::IncludeCycle(name.to_string()).into());
        }
        self.active_includes.push(key);
        let outcome = match include {
            Include::Family(text) => {
                debug!(family = name, "including builtin family");
                self.load_str(puzzle, text, None)
            }
            Include::File(path) => self.load_file(puzzle, &path),
        };
        self.active_includes.pop();
        outcome
    }
}

/// The parameterless constraints addressable by bare name.
fn named_without_parameters(name: &str) -> Option<Constraint> {
    match name {
        "SymbolsAreDigits" => Some(SymbolsAreDigits::default().into()),
        "SymbolsAreDigitsByDiameter" => Some(SymbolsAreDigitsByDiameter.into()),
        "EachRowAndColumnIsPermutation" => Some(EachRowAndColumnIsPermutation.into()),
        "AllCellsMustBeCovered" => Some(AllCellsMustBeCovered.into()),
        _ => None,
    }
}

/// Builds a constraint from a table with a `name` key; the remaining keys
/// are constructor parameters.
fn require<'a>(table: &'a Map<String, Value>, name: &str, key: &str) -> Result<&'a Value> {
    table
        .get(key)
        .ok_or_else(|| PuzzleError::Config(format!("`{name}` needs a `{key}` key")).into())
}

fn named_with_table(name: &str, table: &Map<String, Value>) -> Result<Constraint> {
    let param = |key: &str| require(table, name, key);

    match name {
        "SymbolsAreDigits" => {
            let max = match table.get("max") {
                Some(value) => usize_param(value, "max")?,
                None => 9,
            };
            Ok(SymbolsAreDigits::new(max).into())
        }
        "SymbolsAreDigitsByDiameter" => Ok(SymbolsAreDigitsByDiameter.into()),
        "EachRowAndColumnIsPermutation" => Ok(EachRowAndColumnIsPermutation.into()),
        "AllCellsMustBeCovered" => Ok(AllCellsMustBeCovered.into()),
        "RegionPermutesSymbols" => Ok(RegionPermutesSymbols::new(
            region_param(param("region")?)?,
            symbols_param(param("symbols")?)?,
        )?
        .into()),
        "RegionIsCompletePermutation" => Ok(RegionIsCompletePermutation::new(region_param(
            param("region")?,
        )?)
        .into()),
        "RegionsAreCompletePermutation" => Ok(RegionsAreCompletePermutation::new(
            regions_param(param("regions")?)?,
        )
        .into()),
        "RegionSymbols" => Ok(RegionSymbols::new(
            region_param(param("region")?)?,
            symbols_param(param("symbols")?)?,
        )
        .into()),
        "RegionSymbolLists" => Ok(RegionSymbolLists::new(
            region_param(param("region")?)?,
            lists_param(param("lists")?)?,
        )?
        .into()),
        "SumIs" => Ok(MathOp::sum(
            region_param(param("region")?)?,
            i64_param(param("target")?, "target")?,
        )
        .into()),
        "DifferenceIs" => Ok(MathOp::difference(
            region_param(param("region")?)?,
            i64_param(param("target")?, "target")?,
        )
        .into()),
        "ProductIs" => Ok(MathOp::product(
            region_param(param("region")?)?,
            i64_param(param("target")?, "target")?,
        )
        .into()),
        "QuotientIs" => Ok(MathOp::quotient(
            region_param(param("region")?)?,
            i64_param(param("target")?, "target")?,
        )
        .into()),
        "Math" => math_param(param("expression")?),
        _ => Err(PuzzleError::UnknownConstraint(name.to_string()).into()),
    }
}

/// Builds a constraint from a single-key capitalized table, the value being
/// its initializer.
fn named_with_initializer(name: &str, initializer: &Value) -> Result<Constraint> {
    match name {
        "SymbolsAreDigits" => Ok(SymbolsAreDigits::new(usize_param(initializer, name)?).into()),
        "RegionIsCompletePermutation" => {
            Ok(RegionIsCompletePermutation::new(region_param(initializer)?).into())
        }
        "RegionsAreCompletePermutation" => {
            Ok(RegionsAreCompletePermutation::new(regions_param(initializer)?).into())
        }
        "Math" => math_param(initializer),
        _ => Err(PuzzleError::UnknownConstraint(name.to_string()).into()),
    }
}

fn math_param(value: &Value) -> Result<Constraint> {
    let Some(expression) = value.as_str() else {
        return Err(PuzzleError::Config("`Math` takes an expression string".to_string()).into());
    };
    Ok(MathOp::parse(expression)?.into())
}

fn usize_param(value: &Value, name: &str) -> Result<usize> {
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| PuzzleError::Config(format!("`{name}` must be a positive integer")).into())
}

fn i64_param(value: &Value, name: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| PuzzleError::Config(format!("`{name}` must be an integer")).into())
}

fn size_param(value: &Value) -> Result<(usize, usize)> {
    let dims: Option<Vec<usize>> = value.as_array().map(|values| {
        values
            .iter()
            .filter_map(Value::as_u64)
            .map(|v| v as usize)
            .collect()
    });
    match dims.as_deref() {
        Some([rows, cols]) => Ok((*rows, *cols)),
        _ => Err(PuzzleError::Config("`size` must be a [rows, cols] pair".to_string()).into()),
    }
}

fn grid_param(value: &Value) -> Result<Grid> {
    match value {
        Value::String(text) => Grid::parse(text),
        Value::Array(rows) => {
            let rows: Option<Vec<&str>> = rows.iter().map(Value::as_str).collect();
            match rows {
                Some(rows) => Grid::from_rows(&rows),
                None => {
                    Err(PuzzleError::Config("`initial` rows must be strings".to_string()).into())
                }
            }
        }
        _ => Err(PuzzleError::Config("`initial` must be a grid string or row list".to_string())
            .into()),
    }
}

/// A region is either a chess-notation string or an explicit list of
/// `[row, col]` pairs.
fn region_param(value: &Value) -> Result<Region> {
    match value {
        Value::String(text) => Region::parse(text),
        Value::Array(pairs) => {
            let mut cells = Vec::with_capacity(pairs.len());
            for pair in pairs {
                let coords: Option<Vec<usize>> = pair.as_array().map(|values| {
                    values
                        .iter()
                        .filter_map(Value::as_u64)
                        .map(|v| v as usize)
                        .collect()
                });
                match coords.as_deref() {
                    Some([row, col]) => cells.push(Coord::new(*row, *col)),
                    _ => {
                        return Err(PuzzleError::Config(
                            "region cells must be [row, col] pairs".to_string(),
                        )
                        .into())
                    }
                }
            }
            Ok(Region::new(cells))
        }
        _ => Err(PuzzleError::Config("a region must be a string or cell list".to_string()).into()),
    }
}

fn regions_param(value: &Value) -> Result<Vec<Region>> {
    let Some(entries) = value.as_array() else {
        return Err(PuzzleError::Config("`regions` must be a list".to_string()).into());
    };
    entries.iter().map(region_param).collect()
}

fn symbols_param(value: &Value) -> Result<SymbolSet> {
    let symbols: Option<SymbolSet> = value
        .as_array()
        .map(|values| values.iter().map(Value::as_str).collect::<Option<_>>())
        .unwrap_or(None);
    symbols
        .ok_or_else(|| PuzzleError::Config("`symbols` must be a list of strings".to_string()).into())
}

fn lists_param(value: &Value) -> Result<Vec<SymbolList>> {
    let Some(entries) = value.as_array() else {
        return Err(PuzzleError::Config("`lists` must be a list of lists".to_string()).into());
    };
    entries
        .iter()
        .map(|entry| {
            let symbols: Option<SymbolList> = entry
                .as_array()
                .map(|values| {
                    values
                        .iter()
                        .map(|v| v.as_str().map(str::to_string))
                        .collect::<Option<_>>()
                })
                .unwrap_or(None);
            symbols.ok_or_else(|| {
                PuzzleError::Config("each symbol list must hold strings".to_string()).into()
            })
        })
        .collect()
}
