//! Shared data types for fabric models: wire classification and PIPs.

use crate::direction::Direction;
use crate::ids::WireId;
use serde::{Deserialize, Serialize};

/// What a wire does inside its tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum WireRole {
    /// A pass-through switch node with no terminal semantics.
    Buffer,
    /// One end of a long-haul wire that leaves or enters the tile.
    Span,
    /// A logic pin (route source or sink).
    Pin,
    /// Part of the clock network; never used for data routes.
    Clock,
}

/// Direction, length, and role of a wire, as reported by the fabric.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct WireClass {
    /// Travel direction, if the wire has one.
    pub direction: Option<Direction>,
    /// Length in tiles; `0` for local and fixed connections.
    pub length: u32,
    /// Role of the wire within the tile.
    pub role: WireRole,
}

impl WireClass {
    /// A pass-through buffer wire.
    pub fn buffer() -> Self {
        Self {
            direction: None,
            length: 0,
            role: WireRole::Buffer,
        }
    }

    /// One end of a long-haul wire.
    pub fn span(direction: Direction, length: u32) -> Self {
        Self {
            direction: Some(direction),
            length,
            role: WireRole::Span,
        }
    }

    /// A logic pin.
    pub fn pin() -> Self {
        Self {
            direction: Some(Direction::Local),
            length: 0,
            role: WireRole::Pin,
        }
    }

    /// A clock-network wire.
    pub fn clock(direction: Direction, length: u32) -> Self {
        Self {
            direction: Some(direction),
            length,
            role: WireRole::Clock,
        }
    }
}

/// A programmable interconnect point between two wires of one tile type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Pip {
    /// The driving wire.
    pub src: WireId,
    /// The driven wire.
    pub dst: WireId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        assert_eq!(WireClass::buffer().role, WireRole::Buffer);
        assert_eq!(WireClass::buffer().direction, None);
        let span = WireClass::span(Direction::East, 6);
        assert_eq!(span.direction, Some(Direction::East));
        assert_eq!(span.length, 6);
        assert_eq!(WireClass::pin().length, 0);
        assert_eq!(WireClass::clock(Direction::North, 1).role, WireRole::Clock);
    }

    #[test]
    fn serde_roundtrip() {
        let class = WireClass::span(Direction::West, 2);
        let json = serde_json::to_string(&class).unwrap();
        let back: WireClass = serde_json::from_str(&json).unwrap();
        assert_eq!(class, back);
    }
}
