//! Bounded breadth-first queries over a tile's switch graph.
//!
//! A [`FabricBrowser`] answers the three questions routing asks of a tile:
//!
//! - exit fan-out: which enter junctions can drive a given exit junction;
//! - entrance fan-out: which exit junctions a given enter junction reaches;
//! - tile paths: the concrete PIP walks from an enter to an exit junction.
//!
//! Fan-out junctions carry the PIP count of the walk that reached them as
//! their approach cost. Every search crosses at most `search.max_depth`
//! buffers and truncates silently at that bound. Claimed nodes are skipped, so resources committed
//! by earlier routes never appear in results.

use crate::junction::{EnterWireJunction, ExitWireJunction};
use crate::session::{FanOut, FanOutHit, Occupancy, RoutingSession, TileAdjacency};
use crate::tile_path::TilePath;
use sinew_diagnostics::{Category, Diagnostic, DiagnosticCode};
use sinew_fabric::{Direction, Fabric, NodeId, TileId, WireId};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Note emitted when a tile-path search succeeds.
pub const TILE_PATHS_FOUND: DiagnosticCode = DiagnosticCode::new(Category::Routing, 1);

/// Search front end bound to one fabric and one routing session.
#[derive(Clone, Copy, Debug)]
pub struct FabricBrowser<'a> {
    fabric: &'a dyn Fabric,
    session: &'a RoutingSession,
}

impl<'a> FabricBrowser<'a> {
    /// Creates a browser over `fabric` sharing the caches and occupancy of `session`.
    pub fn new(fabric: &'a dyn Fabric, session: &'a RoutingSession) -> Self {
        Self { fabric, session }
    }

    /// The fabric being searched.
    pub fn fabric(&self) -> &'a dyn Fabric {
        self.fabric
    }

    /// The routing session.
    pub fn session(&self) -> &'a RoutingSession {
        self.session
    }

    fn max_depth(&self) -> u32 {
        self.session.config().search.max_depth
    }

    /// Returns the enter junctions in the exit's tile that can drive it.
    pub fn exit_fan_out(&self, exit: &ExitWireJunction) -> Vec<EnterWireJunction> {
        self.fan_out(FanOut::Exit, exit.tile(), exit.wire(), exit.node())
            .iter()
            .map(|&(w, cost)| {
                EnterWireJunction::new(self.fabric, exit.tile(), w).with_tile_path_cost(cost)
            })
            .collect()
    }

    /// Returns the exit junctions in the entrance's tile that it can reach.
    pub fn entrance_fan_out(&self, entrance: &EnterWireJunction) -> Vec<ExitWireJunction> {
        self.fan_out(FanOut::Entrance, entrance.tile(), entrance.wire(), entrance.node())
            .iter()
            .map(|&(w, cost)| {
                ExitWireJunction::new(self.fabric, entrance.tile(), w).with_tile_path_cost(cost)
            })
            .collect()
    }

    fn fan_out(&self, kind: FanOut, tile: TileId, wire: WireId, node: NodeId) -> Arc<[FanOutHit]> {
        let occupancy = self.session.occupancy();
        if occupancy.touches(tile) {
            return self
                .fan_out_search(kind, tile, wire, node, &|n| occupancy.is_claimed(n))
                .into();
        }
        drop(occupancy);

        let key = (self.fabric.tile_type(tile), wire);
        if let Some(hit) = self.session.cached_fan_out(kind, key) {
            return hit;
        }
        let hits = self.fan_out_search(kind, tile, wire, node, &|_| false);
        self.session.store_fan_out(kind, key, hits)
    }

    fn fan_out_search(
        &self,
        kind: FanOut,
        tile: TileId,
        wire: WireId,
        node: NodeId,
        blocked: &dyn Fn(NodeId) -> bool,
    ) -> Vec<FanOutHit> {
        let tile_type = self.fabric.tile_type(tile);
        let adjacency = self.session.adjacency(self.fabric, tile_type);
        let max_depth = self.max_depth();

        let mut results = Vec::new();
        let mut visited = HashSet::from([node]);
        let mut queue = VecDeque::from([(wire, 0u32)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                break;
            }
            let neighbors = match kind {
                FanOut::Exit => adjacency.uphill(current),
                FanOut::Entrance => adjacency.downhill(current),
            };
            for &next in neighbors {
                let next_node = self.fabric.node_of(tile, next);
                if blocked(next_node) || !visited.insert(next_node) {
                    continue;
                }
                let class = self.fabric.wire_class(tile_type, next);
                let is_hop = matches!(class.direction, Some(d) if d != Direction::Local)
                    && class.length != 0
                    && !self.fabric.is_clock_node(next_node);
                if is_hop {
                    // `depth` buffers lie between `next` and the query wire.
                    results.push((next, depth + 1));
                }
                if self.fabric.is_buffer_node(next_node) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        results
    }

    /// Enumerates the PIP walks from `entrance` to `exit` within one tile.
    ///
    /// Returns an empty list when the junctions are in different tiles. The
    /// first path found fixes a ceiling of its cost plus `search.tolerance`
    /// (never above `search.max_depth`); longer walks are abandoned. A kept
    /// path is penalized one per PIP it runs beyond the cheapest one. Paths
    /// are returned cheapest first and never repeat a node.
    pub fn find_tile_paths(
        &self,
        entrance: &EnterWireJunction,
        exit: &ExitWireJunction,
    ) -> Vec<TilePath> {
        if entrance.tile() != exit.tile() {
            return Vec::new();
        }
        let tile = entrance.tile();
        let adjacency = self.session.adjacency(self.fabric, self.fabric.tile_type(tile));
        let occupancy = self.session.occupancy();
        let paths = self.tile_path_search(&adjacency, &occupancy, entrance, exit);
        drop(occupancy);

        if let Some(cheapest) = paths.first() {
            self.session.sink().emit(
                Diagnostic::note(
                    TILE_PATHS_FOUND,
                    format!(
                        "found {} tile paths for {} --> {}",
                        paths.len(),
                        entrance.describe(self.fabric),
                        exit.describe(self.fabric)
                    ),
                )
                .with_note(format!("minimum cost of tile paths is {}", cheapest.cost())),
            );
        }
        paths
    }

    fn tile_path_search(
        &self,
        adjacency: &TileAdjacency,
        occupancy: &Occupancy,
        entrance: &EnterWireJunction,
        exit: &ExitWireJunction,
    ) -> Vec<TilePath> {
        let tile = entrance.tile();
        let search = &self.session.config().search;
        let mut ceiling = search.max_depth;
        let mut accepted = false;

        let mut paths: Vec<TilePath> = Vec::new();
        let mut seen: HashSet<Vec<WireId>> = HashSet::new();
        let mut queue = VecDeque::from([TilePath::start(tile, entrance.wire(), entrance.node())]);
        while let Some(partial) = queue.pop_front() {
            // Queue order is hop order, so nothing behind this entry is cheaper.
            if partial.hop_count() >= ceiling {
                break;
            }
            for &next in adjacency.downhill(partial.last_wire()) {
                let node = self.fabric.node_of(tile, next);
                if occupancy.is_claimed(node) || partial.contains(node) {
                    continue;
                }
                if node == exit.node() {
                    let path = partial.extended(next, node);
                    if !accepted {
                        accepted = true;
                        ceiling = (path.hop_count() + search.tolerance).min(search.max_depth);
                    }
                    if path.hop_count() <= ceiling && seen.insert(path.wires().to_vec()) {
                        paths.push(path);
                    }
                } else if self.fabric.is_buffer_node(node) {
                    queue.push_back(partial.extended(next, node));
                }
            }
        }
        if let Some(cheapest) = paths.iter().map(TilePath::hop_count).min() {
            for path in &mut paths {
                let slack = path.hop_count() - cheapest;
                path.add_penalty(slack);
            }
        }
        paths.sort_by_key(TilePath::cost);
        paths
    }

    /// Returns `true` if `exit` is reachable from `entrance` inside their tile.
    ///
    /// Always `false` for junctions in different tiles, and `false` when the
    /// depth bound is reached first.
    pub fn is_path_possible(&self, entrance: &EnterWireJunction, exit: &ExitWireJunction) -> bool {
        if entrance.tile() != exit.tile() {
            return false;
        }
        let tile = entrance.tile();
        let adjacency = self.session.adjacency(self.fabric, self.fabric.tile_type(tile));
        let occupancy = self.session.occupancy();
        let max_depth = self.max_depth();

        let mut visited = HashSet::from([entrance.node()]);
        let mut queue = VecDeque::from([(entrance.wire(), 0u32)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                return false;
            }
            for &next in adjacency.downhill(current) {
                let node = self.fabric.node_of(tile, next);
                if node == exit.node() && !occupancy.is_claimed(node) {
                    return true;
                }
                if occupancy.is_claimed(node) || !visited.insert(node) {
                    continue;
                }
                if self.fabric.is_buffer_node(node) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        false
    }
}
