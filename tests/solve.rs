//! End-to-end solves: configuration in, solved grids and technique
//! statistics out.

use gridlock::{Cell, Grid, Loader, Puzzle, PuzzleError};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn load_puzzle(config: &str) -> Puzzle {
    let _ = tracing_subscriber::fmt::try_init();
    let mut puzzle = Puzzle::new();
    Loader::new()
        .load_str(&mut puzzle, config, None)
        .expect("configuration should load");
    puzzle
}

fn solved_grid(puzzle: &Puzzle) -> String {
    puzzle.solution.as_ref().expect("grid").to_string()
}

/// Checks that every row and column holds `1..=size` exactly once.
fn is_latin(grid: &Grid, size: usize) -> bool {
    let full: std::collections::BTreeSet<String> = (1..=size).map(|d| d.to_string()).collect();
    for index in 0..size {
        let row: std::collections::BTreeSet<String> = (0..size)
            .filter_map(|col| {
                grid.at(gridlock::Coord::new(index, col))
                    .settled()
                    .cloned()
            })
            .collect();
        let col: std::collections::BTreeSet<String> = (0..size)
            .filter_map(|row| {
                grid.at(gridlock::Coord::new(row, index))
                    .settled()
                    .cloned()
            })
            .collect();
        if row != full || col != full {
            return false;
        }
    }
    true
}

#[test]
fn classic_sudoku_solves_to_its_unique_grid() {
    let mut puzzle = load_puzzle(
        r#"{
            "initial": [
                "53**7****",
                "6**195***",
                "*98****6*",
                "8***6***3",
                "4**8*3**1",
                "7***2***6",
                "*6****28*",
                "***419**5",
                "****8**79"
            ],
            "constraints": ["Sudoku"]
        }"#,
    );

    assert!(puzzle.solve().unwrap());
    let expected = Grid::from_rows(&[
        "534678912",
        "672195348",
        "198342567",
        "859761423",
        "426853791",
        "713924856",
        "961537284",
        "287419635",
        "345286179",
    ])
    .unwrap();
    assert_eq!(solved_grid(&puzzle), expected.to_string());
    assert!(puzzle.stats.used("partition"));
    assert!(puzzle.stats.used("misfit"));
}

#[test]
fn six_by_six_boxes_solve_by_pure_propagation() {
    let mut puzzle = load_puzzle(
        r#"{
            "initial": [
                "*23456",
                "4*6123",
                "23*564",
                "564*31",
                "3126*5",
                "64531*"
            ],
            "constraints": ["Sudoku6"]
        }"#,
    );

    assert!(puzzle.solve().unwrap());
    let expected = Grid::from_rows(&[
        "123456",
        "456123",
        "231564",
        "564231",
        "312645",
        "645312",
    ])
    .unwrap();
    assert_eq!(solved_grid(&puzzle), expected.to_string());
    assert!(puzzle.stats.used("partition"));
    assert_eq!(puzzle.stats.first_passes, None);
}

#[test]
fn kenken_cages_solve_with_the_arithmetic_techniques() {
    let mut puzzle = load_puzzle(
        r#"{
            "size": [3, 3],
            "constraints": [
                "KenKen",
                "a1=1",
                "a2*a3=6",
                "b1+b2=5",
                "b3+c2+c3=4",
                "c1=3"
            ]
        }"#,
    );

    assert!(puzzle.solve().unwrap());
    let expected = Grid::from_rows(&["123", "231", "312"]).unwrap();
    assert_eq!(solved_grid(&puzzle), expected.to_string());

    for technique in [
        "singleValue",
        "primeFactors",
        "makePermutation",
        "twoCellOperator",
        "regionOperator",
        "removeKnown",
    ] {
        assert!(
            puzzle.stats.used(technique),
            "expected {technique} to fire; fired: {:?}",
            puzzle.stats.techniques
        );
    }
    assert_eq!(puzzle.stats.first_passes, None);
}

#[test]
fn kenken_difference_and_quotient_cages_solve() {
    let mut puzzle = load_puzzle(
        r#"{
            "size": [4, 4],
            "constraints": [
                "KenKen",
                "a1-a2-b1=2",
                "a3-a4=1",
                "b2+b3+c3=8",
                "b4/c4=3",
                "c1-d1=1",
                "c2=4",
                "d2-d3=2",
                "d4=4"
            ]
        }"#,
    );

    assert!(puzzle.solve().unwrap());
    let expected = Grid::from_rows(&["4132", "1243", "3421", "2314"]).unwrap();
    assert_eq!(solved_grid(&puzzle), expected.to_string());

    for technique in [
        "singleValue",
        "twoCellOperator",
        "removeKnown",
        "regionOperator",
    ] {
        assert!(
            puzzle.stats.used(technique),
            "expected {technique} to fire; fired: {:?}",
            puzzle.stats.techniques
        );
    }
}

#[rstest]
#[case::four_by_four(4, "****\n****\n****\n****")]
#[case::three_by_three(3, "***\n***\n***")]
fn an_empty_latin_square_requires_search(#[case] size: usize, #[case] initial: &str) {
    let mut puzzle = load_puzzle(&format!(
        r#"{{"initial": "{}", "constraints": ["Latin"]}}"#,
        initial.replace('\n', "\\n")
    ));

    assert!(puzzle.solve().unwrap());
    assert!(puzzle.stats.used("guess"));
    assert!(puzzle.stats.first_passes.is_some());
    assert!(puzzle.stats.plies >= 1);
    assert!(is_latin(puzzle.solution.as_ref().unwrap(), size));
}

#[test]
fn search_completes_an_underconstrained_kenken() {
    let mut puzzle = load_puzzle(
        r#"{
            "initial": "***\n***\n***",
            "constraints": ["Latin", "a1=1"]
        }"#,
    );

    assert!(puzzle.solve().unwrap());
    assert!(puzzle.stats.used("guess"));
    let grid = puzzle.solution.as_ref().unwrap();
    assert!(is_latin(grid, 3));
    assert_eq!(grid.at(gridlock::Coord::new(0, 0)), &Cell::singleton("1"));
}

#[test]
fn a_contradictory_cell_reports_unsolvable() {
    let mut puzzle = load_puzzle(
        r#"{
            "initial": "13",
            "constraints": [
                {"name": "SymbolsAreDigits", "max": 3},
                {"name": "RegionPermutesSymbols", "region": "a1-a2", "symbols": ["1", "2"]}
            ]
        }"#,
    );

    assert!(!puzzle.solve().unwrap());
    assert!(puzzle.is_unsolvable());
    assert!(!puzzle.is_solved());
}

#[test]
fn uncovered_cells_fail_fast() {
    let mut puzzle = load_puzzle(
        r#"{
            "size": [2, 2],
            "constraints": ["KenKen", "a1+a2=3"]
        }"#,
    );

    let err = puzzle.solve().unwrap_err();
    assert!(matches!(err.inner(), PuzzleError::UncoveredCell(_)));
}

#[test]
fn statistics_round_up_the_work() {
    let mut puzzle = load_puzzle(
        r#"{
            "initial": "12\n**",
            "constraints": ["Latin"]
        }"#,
    );

    assert!(puzzle.solve().unwrap());
    assert!(puzzle.stats.passes > 0);
    let table = gridlock::render_stats_table(&puzzle.stats);
    assert!(table.contains("partition"));
}
