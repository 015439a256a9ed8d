//! Wire junctions: the typed endpoints of long-haul hops at tile boundaries.
//!
//! An [`EnterWireJunction`] is where a long-haul wire arrives in a tile and
//! hands its signal to the tile's switch graph; an [`ExitWireJunction`] is
//! where a signal leaves a tile on a long-haul wire. Route sources and sinks
//! (logic pins) are modelled as an enter and an exit junction respectively.
//!
//! Junctions are immutable values. Two junctions are equal iff their tile and
//! wire match; the cached classification fields never take part.

use serde::{Deserialize, Serialize};
use sinew_fabric::{Direction, Fabric, NodeId, TileId, TileWire, WireId};
use std::hash::{Hash, Hasher};

macro_rules! define_junction {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
        pub struct $name {
            tile: TileId,
            wire: WireId,
            node: NodeId,
            direction: Option<Direction>,
            length: u32,
            tile_path_cost: Option<u32>,
        }

        impl $name {
            /// Creates a junction for `wire` in `tile`, classified through the fabric.
            pub fn new(fabric: &dyn Fabric, tile: TileId, wire: WireId) -> Self {
                let class = fabric.wire_class(fabric.tile_type(tile), wire);
                Self {
                    tile,
                    wire,
                    node: fabric.node_of(tile, wire),
                    direction: class.direction,
                    length: class.length,
                    tile_path_cost: None,
                }
            }

            /// Creates a junction from a tile wire.
            pub fn at(fabric: &dyn Fabric, tile_wire: TileWire) -> Self {
                Self::new(fabric, tile_wire.tile, tile_wire.wire)
            }

            /// Returns a copy carrying a precomputed approach cost.
            pub fn with_tile_path_cost(mut self, cost: u32) -> Self {
                self.tile_path_cost = Some(cost);
                self
            }

            /// The tile holding this junction.
            pub fn tile(&self) -> TileId {
                self.tile
            }

            /// The wire within the tile.
            pub fn wire(&self) -> WireId {
                self.wire
            }

            /// The node the wire belongs to.
            pub fn node(&self) -> NodeId {
                self.node
            }

            /// The tile wire of this junction.
            pub fn tile_wire(&self) -> TileWire {
                TileWire::new(self.tile, self.wire)
            }

            /// Travel direction of the wire, if any.
            pub fn direction(&self) -> Option<Direction> {
                self.direction
            }

            /// Wire length in tiles; `0` for local connections.
            pub fn length(&self) -> u32 {
                self.length
            }

            /// Precomputed approach cost, if one was attached.
            pub fn tile_path_cost(&self) -> Option<u32> {
                self.tile_path_cost
            }

            /// Returns this junction translated by `(dx, dy)` tiles.
            ///
            /// Returns `None` if no tile exists at the translated position or
            /// the translated tile has no wire of the same name.
            pub fn copy_with_offset(&self, fabric: &dyn Fabric, dx: i32, dy: i32) -> Option<Self> {
                let (x, y) = fabric.tile_coords(self.tile);
                let tile = fabric.tile_at(x + dx, y + dy)?;
                let name = fabric.wire_name(fabric.tile_type(self.tile), self.wire);
                let wire = fabric.wire_by_name(fabric.tile_type(tile), name)?;
                let mut copy = Self::new(fabric, tile, wire);
                copy.tile_path_cost = self.tile_path_cost;
                Some(copy)
            }

            /// Formats the junction as `TILE/WIRE`.
            pub fn describe(&self, fabric: &dyn Fabric) -> String {
                fabric.tile_wire_name(self.tile, self.wire)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.tile == other.tile && self.wire == other.wire
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.tile.hash(state);
                self.wire.hash(state);
            }
        }
    };
}

define_junction!(
    /// A long-haul wire arriving in a tile, or a route source pin.
    EnterWireJunction
);

define_junction!(
    /// A long-haul wire leaving a tile, or a route sink pin.
    ExitWireJunction
);

impl EnterWireJunction {
    /// Returns the exit junction in the upstream tile that drives this wire.
    ///
    /// Returns `None` when the wire is driven from within its own tile
    /// (a pin, or a span at the edge of the grid).
    pub fn source_junction(&self, fabric: &dyn Fabric) -> Option<ExitWireJunction> {
        let driver = *fabric.node_wires(self.node).first()?;
        if driver.tile == self.tile {
            return None;
        }
        Some(ExitWireJunction::at(fabric, driver))
    }
}

/// Either kind of junction, as stored in a route template.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum WireJunction {
    /// An entry into a tile.
    Enter(EnterWireJunction),
    /// An exit from a tile.
    Exit(ExitWireJunction),
}

impl WireJunction {
    /// The tile holding this junction.
    pub fn tile(&self) -> TileId {
        match self {
            WireJunction::Enter(j) => j.tile(),
            WireJunction::Exit(j) => j.tile(),
        }
    }

    /// The wire within the tile.
    pub fn wire(&self) -> WireId {
        match self {
            WireJunction::Enter(j) => j.wire(),
            WireJunction::Exit(j) => j.wire(),
        }
    }

    /// The node the wire belongs to.
    pub fn node(&self) -> NodeId {
        match self {
            WireJunction::Enter(j) => j.node(),
            WireJunction::Exit(j) => j.node(),
        }
    }

    /// Travel direction of the wire, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            WireJunction::Enter(j) => j.direction(),
            WireJunction::Exit(j) => j.direction(),
        }
    }

    /// Wire length in tiles.
    pub fn length(&self) -> u32 {
        match self {
            WireJunction::Enter(j) => j.length(),
            WireJunction::Exit(j) => j.length(),
        }
    }

    /// Precomputed approach cost, if one was attached.
    pub fn tile_path_cost(&self) -> Option<u32> {
        match self {
            WireJunction::Enter(j) => j.tile_path_cost(),
            WireJunction::Exit(j) => j.tile_path_cost(),
        }
    }

    /// Returns the enter junction, if this is one.
    pub fn as_enter(&self) -> Option<&EnterWireJunction> {
        match self {
            WireJunction::Enter(j) => Some(j),
            WireJunction::Exit(_) => None,
        }
    }

    /// Returns the exit junction, if this is one.
    pub fn as_exit(&self) -> Option<&ExitWireJunction> {
        match self {
            WireJunction::Exit(j) => Some(j),
            WireJunction::Enter(_) => None,
        }
    }

    /// Returns this junction translated by `(dx, dy)` tiles.
    pub fn copy_with_offset(&self, fabric: &dyn Fabric, dx: i32, dy: i32) -> Option<Self> {
        Some(match self {
            WireJunction::Enter(j) => WireJunction::Enter(j.copy_with_offset(fabric, dx, dy)?),
            WireJunction::Exit(j) => WireJunction::Exit(j.copy_with_offset(fabric, dx, dy)?),
        })
    }

    /// Formats the junction as `TILE/WIRE`.
    pub fn describe(&self, fabric: &dyn Fabric) -> String {
        fabric.tile_wire_name(self.tile(), self.wire())
    }
}

impl From<EnterWireJunction> for WireJunction {
    fn from(j: EnterWireJunction) -> Self {
        WireJunction::Enter(j)
    }
}

impl From<ExitWireJunction> for WireJunction {
    fn from(j: ExitWireJunction) -> Self {
        WireJunction::Exit(j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinew_fabric::{switchbox_grid, GridFabric};

    fn enter(fabric: &GridFabric, tile: &str, wire: &str) -> EnterWireJunction {
        EnterWireJunction::at(fabric, fabric.tile_wire(tile, wire).unwrap())
    }

    fn exit(fabric: &GridFabric, tile: &str, wire: &str) -> ExitWireJunction {
        ExitWireJunction::at(fabric, fabric.tile_wire(tile, wire).unwrap())
    }

    #[test]
    fn classification_from_fabric() {
        let fabric = switchbox_grid(4, 4);
        let j = enter(&fabric, "INT_X2Y0", "EE2END0");
        assert_eq!(j.direction(), Some(Direction::East));
        assert_eq!(j.length(), 2);
        assert_eq!(j.tile_path_cost(), None);
        let pin = exit(&fabric, "INT_X1Y1", "IMUX0");
        assert_eq!(pin.direction(), Some(Direction::Local));
        assert_eq!(pin.length(), 0);
    }

    #[test]
    fn equality_ignores_cost() {
        let fabric = switchbox_grid(2, 2);
        let a = enter(&fabric, "INT_X1Y1", "NN1END0");
        let b = a.with_tile_path_cost(5);
        assert_eq!(a, b);
        assert_ne!(a, enter(&fabric, "INT_X1Y0", "NN1END0"));
    }

    #[test]
    fn source_junction_crosses_tiles() {
        let fabric = switchbox_grid(8, 8);
        let e = enter(&fabric, "INT_X6Y1", "EE6END0");
        let src = e.source_junction(&fabric).unwrap();
        assert_eq!(src, exit(&fabric, "INT_X0Y1", "EE6BEG0"));
        assert_eq!(src.node(), e.node());
    }

    #[test]
    fn edge_wire_has_no_source() {
        let fabric = switchbox_grid(3, 3);
        assert!(enter(&fabric, "INT_X0Y0", "EE1END0")
            .source_junction(&fabric)
            .is_none());
        assert!(enter(&fabric, "INT_X0Y0", "LOGIC_OUT0")
            .source_junction(&fabric)
            .is_none());
    }

    #[test]
    fn offset_copy() {
        let fabric = switchbox_grid(4, 4);
        let j = exit(&fabric, "INT_X1Y1", "NN2BEG0").with_tile_path_cost(3);
        let moved = j.copy_with_offset(&fabric, 2, 1).unwrap();
        assert_eq!(moved.describe(&fabric), "INT_X3Y2/NN2BEG0");
        assert_eq!(moved.tile_path_cost(), Some(3));
        assert_ne!(moved.node(), j.node());
        assert!(j.copy_with_offset(&fabric, 3, 0).is_none());
    }

    #[test]
    fn wire_junction_accessors() {
        let fabric = switchbox_grid(2, 2);
        let e: WireJunction = enter(&fabric, "INT_X0Y0", "LOGIC_OUT1").into();
        assert!(e.as_enter().is_some());
        assert!(e.as_exit().is_none());
        assert_eq!(e.describe(&fabric), "INT_X0Y0/LOGIC_OUT1");
    }
}
