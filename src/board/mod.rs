//! Board representation.
//!
//! Contains the grid model: tiles and their factory, fields, orthogonal
//! adjacency, and the board that owns them all.

pub mod adjacency;
pub mod field;
pub mod state;
pub mod tile;

pub use adjacency::{is_neighbour, neighbours};
pub use field::{Coord, Field};
pub use state::{Board, BoardError};
pub use tile::{Kind, Tile, TileFactory, TileId, MAX_KINDS, MIN_KINDS};
