use serde::{Deserialize, Serialize};

/// A grid cell addressed by `(row, col)`.
///
/// Coordinates are signed so that a head which has left the grid can still be
/// represented (and detected as a wall collision).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the position moved by `(d_row, d_col)` multiplied by `steps`.
    #[must_use]
    pub const fn offset(self, (d_row, d_col): (i32, i32), steps: i32) -> Self {
        Self {
            row: self.row + d_row * steps,
            col: self.col + d_col * steps,
        }
    }

    /// Returns `true` if the position lies within `[0, grid_size)²`.
    #[must_use]
    pub const fn is_in_bounds(self, grid_size: i32) -> bool {
        0 <= self.row && self.row < grid_size && 0 <= self.col && self.col < grid_size
    }

    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Absolute movement direction of the snake.
///
/// The declaration order is the controller's action order: output index 0 is
/// [`Direction::Right`], 1 is [`Direction::Left`], 2 is [`Direction::Down`] and
/// 3 is [`Direction::Up`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    pub const LEN: usize = 4;
    pub const ALL: [Self; Self::LEN] = [Self::Right, Self::Left, Self::Down, Self::Up];

    /// Maps a controller output index to a direction.
    #[must_use]
    pub fn from_action_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub const fn action_index(self) -> usize {
        self as usize
    }

    /// Returns the `(d_row, d_col)` step vector.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Right => (0, 1),
            Self::Left => (0, -1),
            Self::Down => (1, 0),
            Self::Up => (-1, 0),
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
            Self::Up => Self::Down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Position::new(0, 0).is_in_bounds(20));
        assert!(Position::new(19, 19).is_in_bounds(20));
        assert!(!Position::new(20, 0).is_in_bounds(20));
        assert!(!Position::new(0, -1).is_in_bounds(20));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(3, 4);
        let b = Position::new(-1, 7);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(b.manhattan_distance(a), 7);
        assert_eq!(a.manhattan_distance(a), 0);
    }

    #[test]
    fn test_action_index_roundtrip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_action_index(dir.action_index()), Some(dir));
        }
        assert_eq!(Direction::from_action_index(Direction::LEN), None);
    }

    #[test]
    fn test_opposite_cancels_delta() {
        for dir in Direction::ALL {
            let (r1, c1) = dir.delta();
            let (r2, c2) = dir.opposite().delta();
            assert_eq!((r1 + r2, c1 + c2), (0, 0));
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }
}
