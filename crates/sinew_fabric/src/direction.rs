//! Compass directions of long-haul wires.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction a wire travels across the tile grid.
///
/// `Local` is the "self" direction: the wire starts and ends in its own tile
/// (pins, bounce wires). Such wires are never route hops.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Towards increasing row.
    North,
    /// Towards increasing column.
    East,
    /// Towards decreasing row.
    South,
    /// Towards decreasing column.
    West,
    /// Stays in its tile.
    Local,
}

impl Direction {
    /// All four travelling directions.
    pub const COMPASS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the opposite direction. `Local` is its own reverse.
    pub fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Local => Direction::Local,
        }
    }

    /// Returns `true` if the two directions are at right angles.
    pub fn is_orthogonal(self, other: Direction) -> bool {
        let vertical = |d: Direction| matches!(d, Direction::North | Direction::South);
        let horizontal = |d: Direction| matches!(d, Direction::East | Direction::West);
        (vertical(self) && horizontal(other)) || (horizontal(self) && vertical(other))
    }

    /// Unit grid step `(dx, dy)` for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::Local => (0, 0),
        }
    }

    /// One-letter name used in hop summaries.
    pub fn short_name(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
            Direction::Local => "L",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_is_involution() {
        for d in Direction::COMPASS {
            assert_eq!(d.reverse().reverse(), d);
            assert_ne!(d.reverse(), d);
        }
        assert_eq!(Direction::Local.reverse(), Direction::Local);
    }

    #[test]
    fn orthogonality() {
        assert!(Direction::North.is_orthogonal(Direction::East));
        assert!(Direction::West.is_orthogonal(Direction::South));
        assert!(!Direction::North.is_orthogonal(Direction::South));
        assert!(!Direction::East.is_orthogonal(Direction::East));
        assert!(!Direction::Local.is_orthogonal(Direction::North));
    }

    #[test]
    fn offsets_cancel_with_reverse() {
        for d in Direction::COMPASS {
            let (dx, dy) = d.offset();
            let (rx, ry) = d.reverse().offset();
            assert_eq!((dx + rx, dy + ry), (0, 0));
        }
    }
}
