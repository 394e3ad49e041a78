//! Chess-style coordinate notation: `a1` is row 0, column 0, with letters
//! indexing rows and digits indexing columns. Only rows `a`-`i` and columns
//! `1`-`9` are supported, which bounds every notated grid at 9x9.

use crate::{
    error::{PuzzleError, Result},
    solver::coords::Coord,
};

/// Parses a single square like `b3` into integer coordinates.
pub fn parse_square(s: &str) -> Result<Coord> {
    let mut chars = s.chars();
    let (Some(row), Some(col), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(PuzzleError::BadCoordinate(s.to_string()).into());
    };
    if !('a'..='i').contains(&row) || !('1'..='9').contains(&col) {
        return Err(PuzzleError::BadCoordinate(s.to_string()).into());
    }
    Ok(Coord::new(
        row as usize - 'a' as usize,
        col as usize - '1' as usize,
    ))
}

/// Parses a pair of squares like `a1-b2` into every coordinate of the
/// inclusive rectangle between them, in row-major order.
pub fn parse_rect(rect: &str) -> Result<Vec<Coord>> {
    let Some((first, last)) = rect.split_once('-') else {
        return Err(PuzzleError::BadCoordinate(rect.to_string()).into());
    };
    let start = parse_square(first)?;
    let end = parse_square(last)?;
    if end.row < start.row || end.col < start.col {
        return Err(PuzzleError::BadCoordinate(rect.to_string()).into());
    }

    let mut result = Vec::new();
    for row in start.row..=end.row {
        for col in start.col..=end.col {
            result.push(Coord::new(row, col));
        }
    }
    Ok(result)
}

/// Parses a list of squares and rectangles separated by whitespace or
/// commas, e.g. `a1, b1-b2 c2`, into the concatenation of their coordinates.
pub fn parse_list(list: &str) -> Result<Vec<Coord>> {
    let mut result = Vec::new();
    for item in list.split_whitespace() {
        let item = item.trim_matches(',');
        if item.contains('-') {
            result.extend(parse_rect(item)?);
        } else if !item.is_empty() {
            result.push(parse_square(item)?);
        }
    }
    Ok(result)
}

/// Names a coordinate as a chess-style square; coordinates beyond the
/// notation fall back to an `rNcM` form.
pub fn location(coord: Coord) -> String {
    if coord.row < 26 {
        format!("{}{}", (b'a' + coord.row as u8) as char, coord.col + 1)
    } else {
        format!("r{}c{}", coord.row, coord.col)
    }
}

/// Names a list of coordinates, e.g. `[a1 a2]`.
pub fn locations(coords: &[Coord]) -> String {
    let squares: Vec<String> = coords.iter().map(|&c| location(c)).collect();
    format!("[{}]", squares.join(" "))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn squares_parse() {
        assert_eq!(parse_square("a1").unwrap(), Coord::new(0, 0));
        assert_eq!(parse_square("b3").unwrap(), Coord::new(1, 2));
        assert_eq!(parse_square("i9").unwrap(), Coord::new(8, 8));
    }

    #[test]
    fn bad_squares_are_rejected() {
        for bad in ["", "a", "a10", "j1", "a0", "1a"] {
            assert!(parse_square(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn rects_expand_row_major() {
        assert_eq!(
            parse_rect("a1-b2").unwrap(),
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 1)
            ]
        );
        assert_eq!(parse_rect("b1-b1").unwrap(), vec![Coord::new(1, 0)]);
    }

    #[test]
    fn lists_accept_commas_and_whitespace() {
        assert_eq!(parse_list("").unwrap(), vec![]);
        assert_eq!(
            parse_list("a1, b1-b2 c2").unwrap(),
            vec![
                Coord::new(0, 0),
                Coord::new(1, 0),
                Coord::new(1, 1),
                Coord::new(2, 1)
            ]
        );
    }

    #[test]
    fn locations_render() {
        assert_eq!(location(Coord::new(0, 0)), "a1");
        assert_eq!(
            locations(&[Coord::new(0, 0), Coord::new(0, 1)]),
            "[a1 a2]"
        );
    }

    proptest! {
        #[test]
        fn square_round_trips(row in 0usize..9, col in 0usize..9) {
            let coord = Coord::new(row, col);
            prop_assert_eq!(parse_square(&location(coord)).unwrap(), coord);
        }

        #[test]
        fn list_round_trips(coords in proptest::collection::vec((0usize..9, 0usize..9), 0..12)) {
            let coords: Vec<Coord> = coords.into_iter().map(|(r, c)| Coord::new(r, c)).collect();
            let rendered = coords.iter().map(|&c| location(c)).collect::<Vec<_>>().join(" ");
            prop_assert_eq!(parse_list(&rendered).unwrap(), coords);
        }
    }
}
