//! Grid cells.
//!
//! A field is identified by a fixed `(row, col)` coordinate assigned at board
//! construction and holds zero or one tile. Row 0 is the top of the board.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tile::TileId;

/// A `(row, col)` grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    coord: Coord,
    pub(crate) tile: Option<TileId>,
    pub(crate) selected: bool,
}

impl Field {
    pub(crate) fn new(coord: Coord) -> Self {
        Field {
            coord,
            tile: None,
            selected: false,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn row(&self) -> usize {
        self.coord.row
    }

    pub fn col(&self) -> usize {
        self.coord.col
    }

    /// The tile in this field, or `None` while emptied mid-cascade.
    pub fn tile(&self) -> Option<TileId> {
        self.tile
    }

    pub fn is_empty(&self) -> bool {
        self.tile.is_none()
    }

    /// Highlight flag for rendering; carries no game logic.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Top-left corner of this field in a layout of square cells of `cell_size`.
    /// Used as the target of tile motions.
    pub fn position(&self, cell_size: f32) -> (f32, f32) {
        (
            self.coord.col as f32 * cell_size,
            self.coord.row as f32 * cell_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_is_empty_and_unselected() {
        let field = Field::new(Coord::new(2, 5));
        assert!(field.is_empty());
        assert!(!field.is_selected());
        assert_eq!((field.row(), field.col()), (2, 5));
    }

    #[test]
    fn position_scales_with_cell_size() {
        let field = Field::new(Coord::new(3, 1));
        assert_eq!(field.position(64.0), (64.0, 192.0));
    }

    #[test]
    fn coord_display() {
        assert_eq!(Coord::new(4, 7).to_string(), "(4, 7)");
    }
}
