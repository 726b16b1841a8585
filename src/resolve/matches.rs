//! Combination detection.
//!
//! Scans every row and every column for maximal runs of three or more tiles of
//! the same kind. Axes are scanned independently: a tile that sits in both a
//! horizontal and a vertical run is reported in two separate matches, never in
//! one merged shape. An empty field has no kind and breaks any run.

use serde::Serialize;

use crate::board::{Board, Coord, Kind, TileId};

/// Shortest run that counts as a match.
pub const MIN_RUN: usize = 3;

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A maximal same-kind run along one axis, ordered from top/left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub axis: Axis,
    pub kind: Kind,
    pub cells: Vec<Coord>,
    pub tiles: Vec<TileId>,
}

impl Match {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Returns every match on the board: all rows top to bottom, then all columns
/// left to right.
pub fn find_matches(board: &Board) -> Vec<Match> {
    let mut out = Vec::new();
    for row in 0..board.rows() {
        let line = (0..board.cols()).map(|col| Coord::new(row, col));
        scan_line(board, line, Axis::Horizontal, &mut out);
    }
    for col in 0..board.cols() {
        let line = (0..board.rows()).map(|row| Coord::new(row, col));
        scan_line(board, line, Axis::Vertical, &mut out);
    }
    out
}

/// Returns true if the board holds at least one match.
pub fn has_matches(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

fn scan_line<I>(board: &Board, line: I, axis: Axis, out: &mut Vec<Match>)
where
    I: Iterator<Item = Coord>,
{
    let mut run: Vec<(Coord, TileId)> = Vec::new();
    let mut run_kind: Option<Kind> = None;

    for coord in line {
        let tile = board.tile_at(coord);
        let kind = tile.map(|t| t.kind);
        match (tile, kind) {
            (Some(t), Some(k)) if run_kind == Some(k) => run.push((coord, t.id)),
            _ => {
                flush(&mut run, run_kind, axis, out);
                run_kind = kind;
                if let Some(t) = tile {
                    run.push((coord, t.id));
                }
            }
        }
    }
    flush(&mut run, run_kind, axis, out);
}

fn flush(run: &mut Vec<(Coord, TileId)>, kind: Option<Kind>, axis: Axis, out: &mut Vec<Match>) {
    if let Some(kind) = kind {
        if run.len() >= MIN_RUN {
            out.push(Match {
                axis,
                kind,
                cells: run.iter().map(|&(c, _)| c).collect(),
                tiles: run.iter().map(|&(_, t)| t).collect(),
            });
        }
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::layout::parse_layout;

    fn load(layout: &str) -> Board {
        parse_layout(layout, 6, 1).unwrap()
    }

    #[test]
    fn three_in_a_row_beats_a_pair() {
        let board = load("aaabb");
        let matches = find_matches(&board);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.axis, Axis::Horizontal);
        assert_eq!(m.kind, Kind(0));
        assert_eq!(
            m.cells,
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
        );
    }

    #[test]
    fn maximal_run_is_one_match() {
        let board = load("baaaaab");
        let matches = find_matches(&board);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].len(), 5);
        assert_eq!(matches[0].cells[0], Coord::new(0, 1));
    }

    #[test]
    fn vertical_runs_are_found() {
        let board = load("ab/ac/ad/be");
        let matches = find_matches(&board);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].axis, Axis::Vertical);
        assert_eq!(
            matches[0].cells,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)]
        );
    }

    #[test]
    fn crossing_runs_are_not_merged() {
        let board = load("aaa/abc/acb");
        let matches = find_matches(&board);
        assert_eq!(matches.len(), 2);
        let corner = board.tile_at(Coord::new(0, 0)).unwrap().id;
        assert!(matches.iter().all(|m| m.tiles.contains(&corner)));
        assert_eq!(matches[0].axis, Axis::Horizontal);
        assert_eq!(matches[1].axis, Axis::Vertical);
    }

    #[test]
    fn empty_field_breaks_a_run() {
        assert!(find_matches(&load("aa.aa")).is_empty());
        assert_eq!(find_matches(&load("aaa.a")).len(), 1);
    }

    #[test]
    fn two_runs_in_one_line() {
        let board = load("aaabbb");
        let matches = find_matches(&board);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].kind, Kind(0));
        assert_eq!(matches[1].kind, Kind(1));
    }

    #[test]
    fn checkerboard_has_no_matches() {
        let board = load("abab/baba/abab/baba");
        assert!(!has_matches(&board));
    }

    #[test]
    fn detection_is_deterministic() {
        let board = load("aaab/cccb/dddb");
        assert_eq!(find_matches(&board), find_matches(&board));
        assert_eq!(find_matches(&board).len(), 4);
    }
}
