/// Number of cells along one edge of the board
pub const EDGE: usize = 5;

/// Total number of cells on the board
pub const CELLS: usize = EDGE * EDGE;

/// Convert a linear index into `(row, col)`
pub fn row_col(index: usize) -> (usize, usize) {
    (index / EDGE, index % EDGE)
}

/// Convert `(row, col)` back into a linear index
pub fn index(row: usize, col: usize) -> usize {
    row * EDGE + col
}

pub fn contains(index: usize) -> bool {
    index < CELLS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Move a cursor one cell in `direction`, staying put at the board edge.
pub fn step(index: usize, direction: Direction) -> usize {
    let (row, col) = row_col(index);
    let (row, col) = match direction {
        Direction::Up => (row.saturating_sub(1), col),
        Direction::Down => ((row + 1).min(EDGE - 1), col),
        Direction::Left => (row, col.saturating_sub(1)),
        Direction::Right => (row, (col + 1).min(EDGE - 1)),
    };
    self::index(row, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_col_roundtrips_every_cell() {
        for i in 0..CELLS {
            let (row, col) = row_col(i);
            assert!(row < EDGE && col < EDGE);
            assert_eq!(index(row, col), i);
        }
    }

    #[test]
    fn center_is_twelve() {
        assert_eq!(row_col(12), (2, 2));
    }

    #[test]
    fn step_clamps_at_edges() {
        assert_eq!(step(0, Direction::Up), 0);
        assert_eq!(step(0, Direction::Left), 0);
        assert_eq!(step(24, Direction::Down), 24);
        assert_eq!(step(24, Direction::Right), 24);
        assert_eq!(step(4, Direction::Right), 4);
    }

    #[test]
    fn step_moves_one_cell() {
        assert_eq!(step(12, Direction::Up), 7);
        assert_eq!(step(12, Direction::Down), 17);
        assert_eq!(step(12, Direction::Left), 11);
        assert_eq!(step(12, Direction::Right), 13);
    }

    #[test]
    fn contains_bounds() {
        assert!(contains(0));
        assert!(contains(24));
        assert!(!contains(25));
    }
}
