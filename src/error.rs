use std::backtrace::Backtrace;

use crate::solver::coords::Coord;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong while configuring or driving a puzzle.
///
/// Runtime infeasibility (an elimination emptying a cell) is deliberately
/// absent: the grid records it and `Puzzle::is_unsolvable` reports it, so
/// search can treat it as a failed branch rather than an error.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error("unrecognized constraint `{0}`")]
    UnknownConstraint(String),
    #[error("conflicting sizes: {0}x{1} vs {2}x{3}")]
    ConflictingSize(usize, usize, usize, usize),
    #[error("conflicting symbol sets: {0} vs {1}")]
    ConflictingSymbols(String, String),
    #[error("conflicting initial grids")]
    ConflictingGrid,
    #[error("puzzle must be square, but its size is {0}x{1}")]
    NotSquare(usize, usize),
    #[error("coordinate notation stops at i9, but the grid is {0}x{1}")]
    TooLargeForNotation(usize, usize),
    #[error("cell {0} is not covered by any cage")]
    UncoveredCell(Coord),
    #[error("malformed coordinate `{0}`")]
    BadCoordinate(String),
    #[error("malformed cage expression `{0}`")]
    BadExpression(String),
    #[error("malformed grid: {0}")]
    BadGrid(String),
    #[error("can't permute {symbols} symbols into {cells} cells")]
    PermutationArity { symbols: usize, cells: usize },
    #[error("symbol list of length {len} does not fit a region of {cells} cells")]
    ListArity { len: usize, cells: usize },
    #[error("a symbol-list constraint needs at least one list")]
    NoSymbolLists,
    #[error("cannot eliminate at {0} before the alphabet is established")]
    EliminateUninitialized(Coord),
    #[error("include cycle through `{0}`")]
    IncludeCycle(String),
    #[error("configuration: {0}")]
    Config(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{inner}\n{backtrace}")]
    Inner {
        inner: Box<PuzzleError>,
        backtrace: Box<Backtrace>,
    },
}

impl Error {
    /// The underlying [`PuzzleError`], for callers that match on the taxonomy.
    pub fn inner(&self) -> &PuzzleError {
        match self {
            Error::Inner { inner, .. } => inner,
        }
    }
}

impl From<PuzzleError> for Error {
    fn from(inner: PuzzleError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(Backtrace::capture()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        PuzzleError::Config(err.to_string()).into()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        PuzzleError::Config(err.to_string()).into()
    }
}
