//! Board layout notation.
//!
//! A compact single-line encoding of a board's kind grid, used to load
//! contrived positions and to report the board over the text protocol.
//!
//! Format: rows top to bottom separated by `/`; one character per field, a
//! lowercase letter for the tile kind (`a` is kind 0) or `.` for an empty field.
//! Example: `abc/bca/aab` is a 3x3 board.

use crate::board::{Board, Coord, Kind, TileFactory};
use crate::config::MAX_SIZE;

/// Errors that can occur during layout parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,

    #[error("row {row} has {got} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("layout of {rows}x{cols} exceeds the {max}x{max} limit")]
    TooLarge { rows: usize, cols: usize, max: usize },

    #[error("layout has {0} empty fields; a playable position must be full")]
    NotFull(usize),

    #[error("invalid field character: '{0}'")]
    InvalidChar(char),

    #[error("kind '{letter}' is outside an alphabet of {kinds} kinds")]
    KindOutOfRange { letter: char, kinds: u8 },
}

/// Parses a layout into a board whose new tiles will be drawn from a factory
/// of `kinds` symbols seeded with `seed`.
///
/// Tiles are placed as written; ready-made matches are kept.
pub fn parse_layout(s: &str, kinds: u8, seed: u64) -> Result<Board, LayoutError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(LayoutError::Empty);
    }

    let rows: Vec<&str> = trimmed.split('/').collect();
    let width = rows[0].chars().count();
    if width == 0 {
        return Err(LayoutError::Empty);
    }
    if rows.len() > MAX_SIZE || width > MAX_SIZE {
        return Err(LayoutError::TooLarge {
            rows: rows.len(),
            cols: width,
            max: MAX_SIZE,
        });
    }
    for (i, row) in rows.iter().enumerate() {
        let got = row.chars().count();
        if got != width {
            return Err(LayoutError::RaggedRow {
                row: i,
                expected: width,
                got,
            });
        }
    }

    let factory = TileFactory::new(kinds, seed);
    let kinds = factory.kinds();
    let mut board = Board::empty(rows.len(), width, factory);

    for (r, row) in rows.iter().enumerate() {
        for (c, ch) in row.chars().enumerate() {
            if ch == '.' {
                continue;
            }
            let kind = Kind::from_letter(ch).ok_or(LayoutError::InvalidChar(ch))?;
            if kind.0 >= kinds {
                return Err(LayoutError::KindOutOfRange { letter: ch, kinds });
            }
            // Fields are fresh and in range, so placement cannot fail.
            if board.place_tile(Coord::new(r, c), kind).is_err() {
                return Err(LayoutError::InvalidChar(ch));
            }
        }
    }

    Ok(board)
}

/// Parses a layout that is to be played from: every field must hold a tile.
/// `.` is only meaningful for boards captured mid-cascade.
pub fn parse_position(s: &str, kinds: u8, seed: u64) -> Result<Board, LayoutError> {
    let board = parse_layout(s, kinds, seed)?;
    let empty = board.empty_fields().len();
    if empty > 0 {
        return Err(LayoutError::NotFull(empty));
    }
    Ok(board)
}

/// Encodes a board's kind grid in layout notation.
pub fn encode_layout(board: &Board) -> String {
    let mut out = String::with_capacity(board.rows() * (board.cols() + 1));
    for row in 0..board.rows() {
        if row > 0 {
            out.push('/');
        }
        for col in 0..board.cols() {
            match board.kind_at(Coord::new(row, col)) {
                Some(kind) => out.push(kind.letter()),
                None => out.push('.'),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_square_layout() {
        let board = parse_layout("abc/bca/aab", 6, 1).unwrap();
        assert_eq!(board.rows(), 3);
        assert_eq!(board.cols(), 3);
        assert!(board.is_full());
        assert_eq!(board.kind_at(Coord::new(2, 2)), Some(Kind(1)));
        board.check_consistency().unwrap();
    }

    #[test]
    fn parse_keeps_empty_fields() {
        let board = parse_layout("a./.b", 6, 1).unwrap();
        assert_eq!(board.tile_count(), 2);
        assert_eq!(board.empty_fields(), vec![Coord::new(0, 1), Coord::new(1, 0)]);
    }

    #[test]
    fn encode_roundtrip() {
        for layout in ["abc/bca/aab", "a./.b", "abcdef", "a/b/c", "h"] {
            let board = parse_layout(layout, 8, 1).unwrap();
            assert_eq!(encode_layout(&board), layout);
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let board = parse_layout("  ab/ba \n", 6, 1).unwrap();
        assert_eq!(encode_layout(&board), "ab/ba");
    }

    #[test]
    fn empty_layout_rejected() {
        assert_eq!(parse_layout("", 6, 1).unwrap_err(), LayoutError::Empty);
        assert_eq!(parse_layout("/ab", 6, 1).unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn ragged_rows_rejected() {
        assert_eq!(
            parse_layout("abc/ab", 6, 1).unwrap_err(),
            LayoutError::RaggedRow {
                row: 1,
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn bad_characters_rejected() {
        assert_eq!(
            parse_layout("aXb", 6, 1).unwrap_err(),
            LayoutError::InvalidChar('X')
        );
        assert_eq!(
            parse_layout("abz", 6, 1).unwrap_err(),
            LayoutError::InvalidChar('z')
        );
    }

    #[test]
    fn oversized_layout_rejected() {
        let wide = "ab".repeat(MAX_SIZE);
        assert_eq!(
            parse_layout(&wide, 6, 1).unwrap_err(),
            LayoutError::TooLarge {
                rows: 1,
                cols: 2 * MAX_SIZE,
                max: MAX_SIZE
            }
        );
        let tall = vec!["a"; MAX_SIZE + 1].join("/");
        assert!(matches!(
            parse_layout(&tall, 6, 1),
            Err(LayoutError::TooLarge { .. })
        ));
    }

    #[test]
    fn position_must_be_full() {
        assert_eq!(
            parse_position("abc/b.a/cab", 6, 1).unwrap_err(),
            LayoutError::NotFull(1)
        );
        let board = parse_position("abc/bca/cab", 6, 1).unwrap();
        assert!(board.is_full());
    }

    #[test]
    fn kinds_beyond_alphabet_rejected() {
        assert_eq!(
            parse_layout("abg", 6, 1).unwrap_err(),
            LayoutError::KindOutOfRange {
                letter: 'g',
                kinds: 6
            }
        );
    }
}
