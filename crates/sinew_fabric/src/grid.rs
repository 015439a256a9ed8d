//! In-memory fabric model assembled from tile types, tiles, and wire joins.

use crate::ids::{NodeId, TileId, TileTypeId, TileWire, WireId};
use crate::types::{Pip, WireClass, WireRole};
use crate::Fabric;
use sinew_common::{Ident, Interner};
use std::collections::HashMap;

#[derive(Debug)]
struct WireDef {
    name: Ident,
    class: WireClass,
}

#[derive(Debug)]
struct TileTypeDef {
    name: Ident,
    wires: Vec<WireDef>,
    wire_by_name: HashMap<Ident, WireId>,
    pips: Vec<Pip>,
}

#[derive(Debug)]
struct TileDef {
    name: Ident,
    tile_type: TileTypeId,
    x: i32,
    y: i32,
}

#[derive(Debug)]
struct NodeDef {
    wires: Vec<TileWire>,
    is_buffer: bool,
    is_clock: bool,
}

/// Incremental builder for a [`GridFabric`].
///
/// Tile types declare wires and PIPs; tiles instantiate a type at a grid
/// position; [`join`](Self::join) merges two tile wires into one node (the
/// two ends of a long-haul wire). Every tile wire that is never joined forms
/// a node on its own.
#[derive(Debug, Default)]
pub struct FabricBuilder {
    interner: Interner,
    tile_types: Vec<TileTypeDef>,
    tiles: Vec<TileDef>,
    joins: Vec<(TileWire, TileWire)>,
}

impl FabricBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a tile type and returns its ID.
    pub fn add_tile_type(&mut self, name: &str) -> TileTypeId {
        let id = TileTypeId::from_raw(self.tile_types.len() as u32);
        self.tile_types.push(TileTypeDef {
            name: self.interner.get_or_intern(name),
            wires: Vec::new(),
            wire_by_name: HashMap::new(),
            pips: Vec::new(),
        });
        id
    }

    /// Declares a wire on a tile type. Redeclaring a name returns the existing wire.
    pub fn add_wire(&mut self, tile_type: TileTypeId, name: &str, class: WireClass) -> WireId {
        let name = self.interner.get_or_intern(name);
        let def = &mut self.tile_types[tile_type.index()];
        if let Some(&existing) = def.wire_by_name.get(&name) {
            return existing;
        }
        let id = WireId::from_raw(def.wires.len() as u32);
        def.wires.push(WireDef { name, class });
        def.wire_by_name.insert(name, id);
        id
    }

    /// Adds a PIP from `src` to `dst` on a tile type.
    pub fn add_pip(&mut self, tile_type: TileTypeId, src: WireId, dst: WireId) {
        self.tile_types[tile_type.index()]
            .pips
            .push(Pip { src, dst });
    }

    /// Places a tile of the given type at grid position `(x, y)`.
    pub fn add_tile(&mut self, name: &str, tile_type: TileTypeId, x: i32, y: i32) -> TileId {
        let id = TileId::from_raw(self.tiles.len() as u32);
        self.tiles.push(TileDef {
            name: self.interner.get_or_intern(name),
            tile_type,
            x,
            y,
        });
        id
    }

    /// Joins two tile wires into one node. `driver` becomes the node's driving wire.
    pub fn join(&mut self, driver: TileWire, driven: TileWire) {
        self.joins.push((driver, driven));
    }

    /// Freezes the builder into a fabric, resolving nodes.
    pub fn build(self) -> GridFabric {
        let mut base = Vec::with_capacity(self.tiles.len());
        let mut total = 0usize;
        for tile in &self.tiles {
            base.push(total);
            total += self.tile_types[tile.tile_type.index()].wires.len();
        }
        let flat = |tw: TileWire| base[tw.tile.index()] + tw.wire.index();

        let mut parent: Vec<usize> = (0..total).collect();
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }
        for &(a, b) in &self.joins {
            let ra = find(&mut parent, flat(a));
            let rb = find(&mut parent, flat(b));
            if ra != rb {
                parent[rb] = ra;
            }
        }

        // First join naming a group decides its driver.
        let mut driver_of_root: HashMap<usize, usize> = HashMap::new();
        for &(a, _) in &self.joins {
            let root = find(&mut parent, flat(a));
            driver_of_root.entry(root).or_insert(flat(a));
        }

        let mut members: HashMap<usize, Vec<TileWire>> = HashMap::new();
        let mut root_order = Vec::new();
        let mut tile_nodes: Vec<Vec<NodeId>> = Vec::with_capacity(self.tiles.len());
        let mut flat_to_tw = Vec::with_capacity(total);
        for (t, tile) in self.tiles.iter().enumerate() {
            let n = self.tile_types[tile.tile_type.index()].wires.len();
            tile_nodes.push(vec![NodeId::from_raw(0); n]);
            for w in 0..n {
                flat_to_tw.push(TileWire::new(
                    TileId::from_raw(t as u32),
                    WireId::from_raw(w as u32),
                ));
            }
        }
        for i in 0..total {
            let root = find(&mut parent, i);
            let group = members.entry(root).or_insert_with(|| {
                root_order.push(root);
                Vec::new()
            });
            group.push(flat_to_tw[i]);
        }

        let mut nodes = Vec::with_capacity(root_order.len());
        for root in root_order {
            let mut wires = members.remove(&root).unwrap_or_default();
            if let Some(&driver) = driver_of_root.get(&root) {
                let driver = flat_to_tw[driver];
                if let Some(pos) = wires.iter().position(|&tw| tw == driver) {
                    wires[..=pos].rotate_right(1);
                }
            }
            let node = NodeId::from_raw(nodes.len() as u32);
            let mut is_buffer = true;
            let mut is_clock = false;
            for tw in &wires {
                tile_nodes[tw.tile.index()][tw.wire.index()] = node;
                let tile_type = self.tiles[tw.tile.index()].tile_type;
                let role = self.tile_types[tile_type.index()].wires[tw.wire.index()]
                    .class
                    .role;
                is_buffer &= role == WireRole::Buffer;
                is_clock |= role == WireRole::Clock;
            }
            nodes.push(NodeDef {
                wires,
                is_buffer,
                is_clock,
            });
        }

        let tile_by_name = self
            .tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name, TileId::from_raw(i as u32)))
            .collect();
        let tile_by_coords = self
            .tiles
            .iter()
            .enumerate()
            .map(|(i, t)| ((t.x, t.y), TileId::from_raw(i as u32)))
            .collect();

        GridFabric {
            interner: self.interner,
            tile_types: self.tile_types,
            tiles: self.tiles,
            tile_by_name,
            tile_by_coords,
            tile_nodes,
            nodes,
        }
    }
}

/// An in-memory fabric produced by [`FabricBuilder::build`].
#[derive(Debug)]
pub struct GridFabric {
    interner: Interner,
    tile_types: Vec<TileTypeDef>,
    tiles: Vec<TileDef>,
    tile_by_name: HashMap<Ident, TileId>,
    tile_by_coords: HashMap<(i32, i32), TileId>,
    tile_nodes: Vec<Vec<NodeId>>,
    nodes: Vec<NodeDef>,
}

impl GridFabric {
    /// Returns the number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the name of a tile type.
    pub fn tile_type_name(&self, tile_type: TileTypeId) -> &str {
        self.interner
            .resolve(self.tile_types[tile_type.index()].name)
    }

    /// Looks up a tile wire by tile and wire name.
    pub fn tile_wire(&self, tile: &str, wire: &str) -> Option<TileWire> {
        let tile = self.tile_by_name(tile)?;
        let wire = self.wire_by_name(self.tile_type(tile), wire)?;
        Some(TileWire::new(tile, wire))
    }
}

impl Fabric for GridFabric {
    fn tile_name(&self, tile: TileId) -> &str {
        self.interner.resolve(self.tiles[tile.index()].name)
    }

    fn tile_by_name(&self, name: &str) -> Option<TileId> {
        let ident = self.interner.get(name)?;
        self.tile_by_name.get(&ident).copied()
    }

    fn tile_type(&self, tile: TileId) -> TileTypeId {
        self.tiles[tile.index()].tile_type
    }

    fn tile_coords(&self, tile: TileId) -> (i32, i32) {
        let def = &self.tiles[tile.index()];
        (def.x, def.y)
    }

    fn tile_at(&self, x: i32, y: i32) -> Option<TileId> {
        self.tile_by_coords.get(&(x, y)).copied()
    }

    fn tile_pips(&self, tile_type: TileTypeId) -> &[Pip] {
        &self.tile_types[tile_type.index()].pips
    }

    fn wire_name(&self, tile_type: TileTypeId, wire: WireId) -> &str {
        self.interner
            .resolve(self.tile_types[tile_type.index()].wires[wire.index()].name)
    }

    fn wire_by_name(&self, tile_type: TileTypeId, name: &str) -> Option<WireId> {
        let ident = self.interner.get(name)?;
        self.tile_types[tile_type.index()]
            .wire_by_name
            .get(&ident)
            .copied()
    }

    fn wire_class(&self, tile_type: TileTypeId, wire: WireId) -> WireClass {
        self.tile_types[tile_type.index()].wires[wire.index()].class
    }

    fn node_of(&self, tile: TileId, wire: WireId) -> NodeId {
        self.tile_nodes[tile.index()][wire.index()]
    }

    fn node_wires(&self, node: NodeId) -> &[TileWire] {
        &self.nodes[node.index()].wires
    }

    fn is_buffer_node(&self, node: NodeId) -> bool {
        self.nodes[node.index()].is_buffer
    }

    fn is_clock_node(&self, node: NodeId) -> bool {
        self.nodes[node.index()].is_clock
    }
}
