//! Tiles, tile kinds, and the tile factory.
//!
//! A tile is a movable piece with a fixed kind. Tiles are owned by the board;
//! the `field` coordinate on a tile is a back-reference kept in sync with the
//! field's forward reference by board operations only.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::field::Coord;

/// Smallest alphabet that keeps start-match clearing bounded.
pub const MIN_KINDS: u8 = 3;

/// Largest alphabet in the tile catalog.
pub const MAX_KINDS: u8 = 8;

/// Match-relevant type of a tile (its colour or symbol).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Kind(pub u8);

impl Kind {
    /// Returns the lowercase letter used in layout notation (`a` for kind 0).
    pub const fn letter(self) -> char {
        (b'a' + self.0) as char
    }

    /// Parses a kind from its layout letter.
    pub fn from_letter(c: char) -> Option<Kind> {
        if c.is_ascii_lowercase() && (c as u8 - b'a') < MAX_KINDS {
            Some(Kind(c as u8 - b'a'))
        } else {
            None
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Stable identity of a tile. Never reused within one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A game piece occupying at most one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub id: TileId,
    pub kind: Kind,
    pub(crate) field: Option<Coord>,
}

impl Tile {
    /// The field this tile currently occupies, if any.
    pub fn field(&self) -> Option<Coord> {
        self.field
    }
}

/// Produces tiles of uniformly random kind from a fixed alphabet.
///
/// Seeded factories are reproducible: the same seed and the same sequence of
/// calls yields the same kinds and ids.
#[derive(Debug, Clone)]
pub struct TileFactory {
    kinds: u8,
    rng: SmallRng,
    next_id: u64,
}

impl TileFactory {
    /// Creates a factory over `kinds` symbols. A seed of 0 draws from entropy.
    ///
    /// `kinds` is clamped into `MIN_KINDS..=MAX_KINDS`; callers validate
    /// configuration before reaching this point.
    pub fn new(kinds: u8, seed: u64) -> Self {
        let rng = if seed != 0 {
            SmallRng::seed_from_u64(seed)
        } else {
            SmallRng::from_entropy()
        };
        TileFactory {
            kinds: kinds.clamp(MIN_KINDS, MAX_KINDS),
            rng,
            next_id: 1,
        }
    }

    /// Size of the kind alphabet.
    pub fn kinds(&self) -> u8 {
        self.kinds
    }

    /// Returns a fresh, unplaced tile of a random kind.
    pub fn generate(&mut self) -> Tile {
        let kind = Kind(self.rng.gen_range(0..self.kinds));
        self.with_kind(kind)
    }

    /// Returns a fresh, unplaced tile of the given kind.
    pub fn with_kind(&mut self, kind: Kind) -> Tile {
        let id = TileId(self.next_id);
        self.next_id += 1;
        Tile {
            id,
            kind,
            field: None,
        }
    }

    /// Random source shared with cosmetic timing so seeded games replay exactly.
    pub(crate) fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }
}
