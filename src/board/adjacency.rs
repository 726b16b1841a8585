//! Orthogonal adjacency on the tile grid.
//!
//! Two fields are neighbours iff their coordinates differ by exactly one in
//! exactly one axis. Diagonals are never adjacent.

use super::field::Coord;

/// Row/column offsets of the four orthogonal neighbours (up, down, left, right).
const OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Returns true if `a` and `b` are at Manhattan distance 1.
pub fn is_neighbour(a: Coord, b: Coord) -> bool {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col) == 1
}

/// Returns the in-bounds orthogonal neighbours of `coord` on a `rows x cols` grid.
pub fn neighbours(coord: Coord, rows: usize, cols: usize) -> Vec<Coord> {
    OFFSETS
        .iter()
        .filter_map(|&(dr, dc)| {
            let row = coord.row.checked_add_signed(dr)?;
            let col = coord.col.checked_add_signed(dc)?;
            (row < rows && col < cols).then_some(Coord::new(row, col))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_and_vertical_steps_are_neighbours() {
        for row in 0..8 {
            for col in 0..8 {
                let c = Coord::new(row, col);
                assert!(is_neighbour(c, Coord::new(row, col + 1)));
                assert!(is_neighbour(c, Coord::new(row + 1, col)));
                assert!(is_neighbour(Coord::new(row, col + 1), c));
            }
        }
    }

    #[test]
    fn diagonal_and_distant_are_not_neighbours() {
        for row in 0..8 {
            for col in 0..7 {
                let c = Coord::new(row, col);
                assert!(!is_neighbour(c, Coord::new(row + 1, col + 1)));
                assert!(!is_neighbour(c, Coord::new(row, col + 2)));
            }
        }
    }

    #[test]
    fn a_field_is_not_its_own_neighbour() {
        let c = Coord::new(4, 4);
        assert!(!is_neighbour(c, c));
    }

    #[test]
    fn corner_has_two_neighbours() {
        let mut n = neighbours(Coord::new(0, 0), 9, 9);
        n.sort();
        assert_eq!(n, vec![Coord::new(0, 1), Coord::new(1, 0)]);
    }

    #[test]
    fn interior_has_four_neighbours() {
        let n = neighbours(Coord::new(4, 4), 9, 9);
        assert_eq!(n.len(), 4);
        assert!(n.iter().all(|&m| is_neighbour(m, Coord::new(4, 4))));
    }

    #[test]
    fn single_cell_board_has_none() {
        assert!(neighbours(Coord::new(0, 0), 1, 1).is_empty());
    }
}
