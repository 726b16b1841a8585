//! Cascade passes over the board.
//!
//! Each pass mutates the board immediately and returns the tile movements it
//! implies, so the caller can animate them and join on their completion before
//! running the next pass. Mutual consistency holds after every pass.

use std::collections::BTreeSet;

use tracing::trace;

use super::matches::{find_matches, Match};
use crate::board::{Board, BoardError, Coord, TileId};

/// A tile that dropped from `from` into the empty field `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub tile: TileId,
    pub from: Coord,
    pub to: Coord,
}

/// A tile generated into an empty field after gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub tile: TileId,
    pub to: Coord,
}

/// Removes every tile that appears in any match. A tile shared by a horizontal
/// and a vertical match is removed once. Returns the removed ids in ascending
/// order.
pub fn remove_matches(board: &mut Board, matches: &[Match]) -> Result<Vec<TileId>, BoardError> {
    let doomed: BTreeSet<TileId> = matches.iter().flat_map(|m| m.tiles.iter().copied()).collect();
    for &id in &doomed {
        board.remove_tile(id)?;
    }
    trace!(removed = doomed.len(), "matches removed");
    Ok(doomed.into_iter().collect())
}

/// Gravity pass. Scans rows bottom to top; every empty field pulls down the
/// nearest tile above it in the same column. Fields with nothing above stay
/// empty for the refill pass. Each tile falls at most once per pass.
pub fn collapse(board: &mut Board) -> Result<Vec<Fall>, BoardError> {
    let mut falls = Vec::new();
    for row in (0..board.rows()).rev() {
        for col in (0..board.cols()).rev() {
            let empty = Coord::new(row, col);
            if board.tile_at(empty).is_some() {
                continue;
            }
            let above = (0..row)
                .rev()
                .map(|r| Coord::new(r, col))
                .find_map(|c| board.tile_at(c).map(|t| (c, t.id)));
            if let Some((from, tile)) = above {
                board.move_tile(tile, empty)?;
                falls.push(Fall {
                    tile,
                    from,
                    to: empty,
                });
            }
        }
    }
    trace!(falls = falls.len(), "gravity pass");
    Ok(falls)
}

/// Refill pass: every empty field gets a freshly generated tile.
pub fn refill(board: &mut Board) -> Result<Vec<Spawn>, BoardError> {
    let mut spawns = Vec::new();
    for to in board.empty_fields() {
        let tile = board.create_tile(to)?;
        spawns.push(Spawn { tile, to });
    }
    trace!(spawns = spawns.len(), "refill pass");
    Ok(spawns)
}

/// Replaces ready-made matches in place (remove and refill, no gravity) until
/// the board presents none. Returns how many rounds were needed.
pub fn clear_start_matches(board: &mut Board) -> Result<usize, BoardError> {
    let mut rounds = 0;
    let mut matches = find_matches(board);
    while !matches.is_empty() {
        remove_matches(board, &matches)?;
        refill(board)?;
        rounds += 1;
        matches = find_matches(board);
    }
    Ok(rounds)
}
