//! Intra-tile paths between an enter junction and an exit junction.

use serde::{Deserialize, Serialize};
use sinew_fabric::{Fabric, NodeId, TileId, TileWire, WireId};
use std::fmt;

/// An ordered walk through one tile's switch graph.
///
/// `wires[0]` is the entering wire and the last element is the exiting wire;
/// every consecutive pair is one PIP of the tile. `nodes` parallels `wires`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TilePath {
    tile: TileId,
    wires: Vec<WireId>,
    nodes: Vec<NodeId>,
    penalty: u32,
}

impl TilePath {
    /// Starts a path at `wire` in `tile`.
    pub fn start(tile: TileId, wire: WireId, node: NodeId) -> Self {
        Self {
            tile,
            wires: vec![wire],
            nodes: vec![node],
            penalty: 0,
        }
    }

    /// Returns a copy extended by one PIP to `wire`.
    pub fn extended(&self, wire: WireId, node: NodeId) -> Self {
        let mut next = self.clone();
        next.wires.push(wire);
        next.nodes.push(node);
        next
    }

    /// The tile the path runs through.
    pub fn tile(&self) -> TileId {
        self.tile
    }

    /// The wires of the path, entering wire first.
    pub fn wires(&self) -> &[WireId] {
        &self.wires
    }

    /// The nodes of the path, entering node first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The last wire of the path.
    pub fn last_wire(&self) -> WireId {
        self.wires[self.wires.len() - 1]
    }

    /// Number of PIPs on the path.
    pub fn hop_count(&self) -> u32 {
        (self.wires.len() - 1) as u32
    }

    /// Hop count plus any penalty attached by the caller.
    pub fn cost(&self) -> u32 {
        self.hop_count() + self.penalty
    }

    /// Adds a penalty (e.g., for exceeding the search tolerance).
    pub fn add_penalty(&mut self, penalty: u32) {
        self.penalty += penalty;
    }

    /// Returns `true` if the path passes through `node`.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// The PIPs of the path as `(src, dst)` tile wires.
    pub fn pips(&self) -> impl Iterator<Item = (TileWire, TileWire)> + '_ {
        self.wires.windows(2).map(move |pair| {
            (
                TileWire::new(self.tile, pair[0]),
                TileWire::new(self.tile, pair[1]),
            )
        })
    }

    /// Formats the path as `TILE/A -> B -> C`.
    pub fn describe(&self, fabric: &dyn Fabric) -> String {
        let tile_type = fabric.tile_type(self.tile);
        let wires: Vec<&str> = self
            .wires
            .iter()
            .map(|&w| fabric.wire_name(tile_type, w))
            .collect();
        format!("{}/{}", fabric.tile_name(self.tile), wires.join(" -> "))
    }
}

impl PartialEq for TilePath {
    fn eq(&self, other: &Self) -> bool {
        self.tile == other.tile && self.wires == other.wires
    }
}

impl Eq for TilePath {}

impl fmt::Display for TilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile path of {} hops [cost {}]", self.hop_count(), self.cost())
    }
}
