//! Fabric models for the Sinew router.
//!
//! The router never owns the device database. It talks to it through the
//! [`Fabric`] trait, which answers the handful of questions a routing search
//! needs: which PIPs a tile has, which node a tile wire belongs to, and how a
//! wire is classified (direction, length, buffer, clock).
//!
//! [`GridFabric`] is an in-memory implementation assembled with a
//! [`FabricBuilder`], and [`switchbox_grid`] builds a small synthetic device
//! of identical interconnect tiles.
//!
//! ```
//! use sinew_fabric::{switchbox_grid, Fabric};
//!
//! let fabric = switchbox_grid(4, 4);
//! let tile = fabric.tile_at(1, 2).unwrap();
//! assert_eq!(fabric.tile_name(tile), "INT_X1Y2");
//! ```

#![warn(missing_docs)]

pub mod direction;
pub mod grid;
pub mod ids;
pub mod synthetic;
pub mod types;

pub use direction::Direction;
pub use grid::{FabricBuilder, GridFabric};
pub use ids::{NodeId, TileId, TileTypeId, TileWire, WireId};
pub use synthetic::switchbox_grid;
pub use types::{Pip, WireClass, WireRole};

/// The device fabric as seen by the router.
///
/// Implementations must be shareable between routing jobs; every method is a
/// read-only query against static topology.
pub trait Fabric: std::fmt::Debug + Send + Sync {
    /// Returns the name of a tile (e.g., "INT_X3Y4").
    fn tile_name(&self, tile: TileId) -> &str;

    /// Looks up a tile by name.
    fn tile_by_name(&self, name: &str) -> Option<TileId>;

    /// Returns the type of a tile.
    fn tile_type(&self, tile: TileId) -> TileTypeId;

    /// Returns the grid coordinates `(x, y)` of a tile.
    fn tile_coords(&self, tile: TileId) -> (i32, i32);

    /// Returns the tile at the given grid coordinates, if any.
    fn tile_at(&self, x: i32, y: i32) -> Option<TileId>;

    /// Returns every PIP of a tile type.
    fn tile_pips(&self, tile_type: TileTypeId) -> &[Pip];

    /// Returns the name of a wire within a tile type.
    fn wire_name(&self, tile_type: TileTypeId, wire: WireId) -> &str;

    /// Looks up a wire of a tile type by name.
    fn wire_by_name(&self, tile_type: TileTypeId, name: &str) -> Option<WireId>;

    /// Classifies a wire by direction, length, and role.
    fn wire_class(&self, tile_type: TileTypeId, wire: WireId) -> WireClass;

    /// Returns the node a tile wire belongs to.
    fn node_of(&self, tile: TileId, wire: WireId) -> NodeId;

    /// Returns the tile wires forming a node; the driving wire comes first.
    fn node_wires(&self, node: NodeId) -> &[TileWire];

    /// Returns `true` if the node is a pass-through switch node.
    fn is_buffer_node(&self, node: NodeId) -> bool;

    /// Returns `true` if the node belongs to the clock network.
    fn is_clock_node(&self, node: NodeId) -> bool;

    /// Returns the name of a tile wire as `TILE/WIRE`.
    fn tile_wire_name(&self, tile: TileId, wire: WireId) -> String {
        format!(
            "{}/{}",
            self.tile_name(tile),
            self.wire_name(self.tile_type(tile), wire)
        )
    }
}
