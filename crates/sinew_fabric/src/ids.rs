//! Opaque ID newtypes for fabric entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`. A [`WireId`] is relative to a tile type: the same
//! `WireId` names the same wire in every tile of that type, which is what lets
//! fan-out results be shared between tiles.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// A tile instance in the fabric grid.
    TileId
);

define_id!(
    /// A tile type; tiles of one type share wires and PIPs.
    TileTypeId
);

define_id!(
    /// A wire within a tile type.
    WireId
);

define_id!(
    /// An electrical node: the set of tile wires joined by metal.
    NodeId
);

/// A wire of a specific tile instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TileWire {
    /// The tile instance.
    pub tile: TileId,
    /// The wire within the tile's type.
    pub wire: WireId,
}

impl TileWire {
    /// Creates a tile wire.
    pub fn new(tile: TileId, wire: WireId) -> Self {
        Self { tile, wire }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = NodeId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn tile_wire_hash_in_set() {
        let a = TileWire::new(TileId::from_raw(1), WireId::from_raw(2));
        let b = TileWire::new(TileId::from_raw(1), WireId::from_raw(2));
        let c = TileWire::new(TileId::from_raw(2), WireId::from_raw(2));
        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = WireId::from_raw(7);
        let json = serde_json::to_string(&id).unwrap();
        let back: WireId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
