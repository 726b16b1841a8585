//! Board representation.
//!
//! The board owns every field and every tile. Fields are stored row-major for
//! O(1) coordinate lookup; tiles are stored by id. The tile/field relation is a
//! pair of plain ids that board methods always update together, so for every
//! occupied field `F`, `tile(F.tile).field == F`.

use std::collections::HashMap;

use super::adjacency::is_neighbour;
use super::field::{Coord, Field};
use super::tile::{Kind, Tile, TileFactory, TileId};

/// Contract violations raised by board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("coordinate ({row}, {col}) is outside the board")]
    OutOfRange { row: usize, col: usize },

    #[error("field {0} already holds a tile")]
    FieldOccupied(Coord),

    #[error("field {0} holds no tile")]
    FieldEmpty(Coord),

    #[error("tile {0} is not on the board")]
    UnknownTile(TileId),

    #[error("tile {0} does not occupy a field")]
    TileNotPlaced(TileId),

    #[error("board invariant broken: {0}")]
    Inconsistent(String),
}

/// The full grid of fields plus the tiles placed on it.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    fields: Vec<Field>,
    tiles: HashMap<TileId, Tile>,
    factory: TileFactory,
}

impl Board {
    /// Creates a `rows x cols` board with every field empty.
    pub fn empty(rows: usize, cols: usize, factory: TileFactory) -> Self {
        let mut fields = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                fields.push(Field::new(Coord::new(row, col)));
            }
        }
        Board {
            rows,
            cols,
            fields,
            tiles: HashMap::with_capacity(rows * cols),
            factory,
        }
    }

    /// Creates a full board: one freshly generated tile in every field.
    ///
    /// The result may contain ready-made matches; see
    /// [`clear_start_matches`](crate::resolve::clear_start_matches).
    pub fn new(rows: usize, cols: usize, factory: TileFactory) -> Self {
        let mut board = Board::empty(rows, cols, factory);
        for idx in 0..board.fields.len() {
            let tile = board.factory.generate();
            board.install(idx, tile);
        }
        board
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Size of the kind alphabet used for new tiles.
    pub fn kinds(&self) -> u8 {
        self.factory.kinds()
    }

    pub(crate) fn factory_mut(&mut self) -> &mut TileFactory {
        &mut self.factory
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        (coord.row < self.rows && coord.col < self.cols).then(|| coord.row * self.cols + coord.col)
    }

    fn checked_index(&self, coord: Coord) -> Result<usize, BoardError> {
        self.index(coord).ok_or(BoardError::OutOfRange {
            row: coord.row,
            col: coord.col,
        })
    }

    /// Looks up the field at `coord`; `None` if out of range.
    pub fn field(&self, coord: Coord) -> Option<&Field> {
        self.index(coord).map(|i| &self.fields[i])
    }

    /// All fields in row-major order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Iterates the tiles currently on the board, in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// The tile occupying `coord`, if any.
    pub fn tile_at(&self, coord: Coord) -> Option<&Tile> {
        self.field(coord)
            .and_then(|f| f.tile)
            .and_then(|id| self.tiles.get(&id))
    }

    /// Kind of the tile at `coord`; `None` for empty or out-of-range fields.
    pub fn kind_at(&self, coord: Coord) -> Option<Kind> {
        self.tile_at(coord).map(|t| t.kind)
    }

    /// The coordinate a tile occupies, failing if the tile is unknown or unplaced.
    pub fn position_of(&self, id: TileId) -> Result<Coord, BoardError> {
        let tile = self.tiles.get(&id).ok_or(BoardError::UnknownTile(id))?;
        tile.field.ok_or(BoardError::TileNotPlaced(id))
    }

    /// Returns true if both tiles are on the board and orthogonally adjacent.
    pub fn is_neighbour(&self, a: TileId, b: TileId) -> Result<bool, BoardError> {
        Ok(is_neighbour(self.position_of(a)?, self.position_of(b)?))
    }

    pub fn is_full(&self) -> bool {
        self.fields.iter().all(|f| f.tile.is_some())
    }

    /// Coordinates of every empty field, row-major.
    pub fn empty_fields(&self) -> Vec<Coord> {
        self.fields
            .iter()
            .filter(|f| f.tile.is_none())
            .map(Field::coord)
            .collect()
    }

    fn install(&mut self, idx: usize, mut tile: Tile) -> TileId {
        let id = tile.id;
        tile.field = Some(self.fields[idx].coord());
        self.fields[idx].tile = Some(id);
        self.tiles.insert(id, tile);
        id
    }

    /// Generates a new tile into the empty field at `coord`.
    pub fn create_tile(&mut self, coord: Coord) -> Result<TileId, BoardError> {
        let idx = self.checked_index(coord)?;
        if self.fields[idx].tile.is_some() {
            return Err(BoardError::FieldOccupied(coord));
        }
        let tile = self.factory.generate();
        Ok(self.install(idx, tile))
    }

    /// Installs a new tile of a chosen kind into the empty field at `coord`.
    pub fn place_tile(&mut self, coord: Coord, kind: Kind) -> Result<TileId, BoardError> {
        let idx = self.checked_index(coord)?;
        if self.fields[idx].tile.is_some() {
            return Err(BoardError::FieldOccupied(coord));
        }
        let tile = self.factory.with_kind(kind);
        Ok(self.install(idx, tile))
    }

    /// Exchanges the fields of two placed tiles. Adjacency is not checked.
    pub fn swap(&mut self, a: TileId, b: TileId) -> Result<(), BoardError> {
        let ca = self.position_of(a)?;
        let cb = self.position_of(b)?;
        let ia = self.checked_index(ca)?;
        let ib = self.checked_index(cb)?;

        self.fields[ia].tile = Some(b);
        self.fields[ib].tile = Some(a);
        if let Some(t) = self.tiles.get_mut(&a) {
            t.field = Some(cb);
        }
        if let Some(t) = self.tiles.get_mut(&b) {
            t.field = Some(ca);
        }
        Ok(())
    }

    /// Moves a placed tile into the empty field at `to`, vacating its old field.
    pub fn move_tile(&mut self, id: TileId, to: Coord) -> Result<(), BoardError> {
        let from = self.position_of(id)?;
        let from_idx = self.checked_index(from)?;
        let to_idx = self.checked_index(to)?;
        if self.fields[to_idx].tile.is_some() {
            return Err(BoardError::FieldOccupied(to));
        }

        self.fields[from_idx].tile = None;
        self.fields[to_idx].tile = Some(id);
        if let Some(t) = self.tiles.get_mut(&id) {
            t.field = Some(to);
        }
        Ok(())
    }

    /// Destroys a tile, clearing the field that held it.
    pub fn remove_tile(&mut self, id: TileId) -> Result<Tile, BoardError> {
        let coord = self.position_of(id)?;
        let idx = self.checked_index(coord)?;
        self.fields[idx].tile = None;
        self.fields[idx].selected = false;
        let mut tile = self.tiles.remove(&id).ok_or(BoardError::UnknownTile(id))?;
        tile.field = None;
        Ok(tile)
    }

    /// Sets the highlight flag on a field.
    pub fn select(&mut self, coord: Coord) -> Result<(), BoardError> {
        let idx = self.checked_index(coord)?;
        self.fields[idx].selected = true;
        Ok(())
    }

    /// Clears the highlight flag on a field.
    pub fn unselect(&mut self, coord: Coord) -> Result<(), BoardError> {
        let idx = self.checked_index(coord)?;
        self.fields[idx].selected = false;
        Ok(())
    }

    /// Verifies that every field/tile pair references each other and that no
    /// tile is off the grid.
    pub fn check_consistency(&self) -> Result<(), BoardError> {
        for field in &self.fields {
            if let Some(id) = field.tile {
                let tile = self.tiles.get(&id).ok_or_else(|| {
                    BoardError::Inconsistent(format!(
                        "field {} references missing tile {}",
                        field.coord(),
                        id
                    ))
                })?;
                if tile.field != Some(field.coord()) {
                    return Err(BoardError::Inconsistent(format!(
                        "tile {} points at {:?} but sits in {}",
                        id,
                        tile.field,
                        field.coord()
                    )));
                }
            }
        }
        for tile in self.tiles.values() {
            let coord = tile.field.ok_or_else(|| {
                BoardError::Inconsistent(format!("tile {} has no field", tile.id))
            })?;
            let held = self.field(coord).and_then(|f| f.tile);
            if held != Some(tile.id) {
                return Err(BoardError::Inconsistent(format!(
                    "tile {} claims {} which holds {:?}",
                    tile.id, coord, held
                )));
            }
        }
        Ok(())
    }

    /// Kind of every field, row-major; `None` marks an empty field.
    pub fn kind_grid(&self) -> Vec<Vec<Option<Kind>>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.kind_at(Coord::new(row, col)))
                    .collect()
            })
            .collect()
    }

    /// Tile identity of every field, row-major.
    pub fn id_grid(&self) -> Vec<Vec<Option<TileId>>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.fields[row * self.cols + col].tile)
                    .collect()
            })
            .collect()
    }
}
