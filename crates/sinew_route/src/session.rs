//! The routing session: shared occupancy, fan-out caches, and diagnostics.
//!
//! One [`RoutingSession`] lives for one routing run and is passed by
//! reference into every search. It is `Sync`; concurrent routing jobs share
//! it directly.
//!
//! Occupancy has two parts. The *footprint* is the set of nodes already used
//! by the design before routing starts; *locks* are nodes claimed by routes
//! completed during this run. Both are read by every search, and a claimed
//! node is invisible to all later searches in every job.
//!
//! Fan-out caches hold topology-only results keyed by `(TileTypeId, WireId)`.
//! Each entry lists the junction wires found together with the PIP count of
//! the walk that reached them. They never see occupancy and are never
//! invalidated. Racing fills of the
//! same key compute the same value, so the first insert wins and later ones
//! are dropped.

use sinew_config::RouterConfig;
use sinew_diagnostics::DiagnosticSink;
use sinew_fabric::{Fabric, NodeId, TileId, TileTypeId, WireId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Which side of a tile a fan-out query searches from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum FanOut {
    /// From an exit junction backwards to the enter junctions feeding it.
    Exit,
    /// From an enter junction forwards to the exit junctions it reaches.
    Entrance,
}

/// PIP adjacency of one tile type, in both directions.
#[derive(Debug, Default)]
pub struct TileAdjacency {
    downhill: HashMap<WireId, Vec<WireId>>,
    uphill: HashMap<WireId, Vec<WireId>>,
}

impl TileAdjacency {
    /// Builds the adjacency lists of a tile type from its PIPs.
    pub fn build(fabric: &dyn Fabric, tile_type: TileTypeId) -> Self {
        let mut adjacency = Self::default();
        for pip in fabric.tile_pips(tile_type) {
            adjacency.downhill.entry(pip.src).or_default().push(pip.dst);
            adjacency.uphill.entry(pip.dst).or_default().push(pip.src);
        }
        adjacency
    }

    /// Wires driven by `wire`.
    pub fn downhill(&self, wire: WireId) -> &[WireId] {
        self.downhill.get(&wire).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Wires driving `wire`.
    pub fn uphill(&self, wire: WireId) -> &[WireId] {
        self.uphill.get(&wire).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Claimed nodes and the tiles they touch.
#[derive(Debug, Default)]
pub struct Occupancy {
    footprint: HashSet<NodeId>,
    locks: HashSet<NodeId>,
    tiles: HashMap<TileId, usize>,
}

impl Occupancy {
    /// Returns `true` if the node is in the footprint or locked.
    pub fn is_claimed(&self, node: NodeId) -> bool {
        self.locks.contains(&node) || self.footprint.contains(&node)
    }

    /// Returns `true` if any claimed node has a wire in `tile`.
    pub fn touches(&self, tile: TileId) -> bool {
        self.tiles.contains_key(&tile)
    }

    fn count_tiles(&mut self, fabric: &dyn Fabric, node: NodeId) {
        for tw in fabric.node_wires(node) {
            *self.tiles.entry(tw.tile).or_insert(0) += 1;
        }
    }

    fn uncount_tiles(&mut self, fabric: &dyn Fabric, node: NodeId) {
        for tw in fabric.node_wires(node) {
            if let Some(count) = self.tiles.get_mut(&tw.tile) {
                *count -= 1;
                if *count == 0 {
                    self.tiles.remove(&tw.tile);
                }
            }
        }
    }
}

/// Fan-out cache counters.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CacheStats {
    /// Queries answered from a cache.
    pub hits: usize,
    /// Queries that populated a cache.
    pub misses: usize,
}

/// A fan-out result: the junction wire and the PIPs walked to reach it.
pub(crate) type FanOutHit = (WireId, u32);

type FanOutCache = RwLock<HashMap<(TileTypeId, WireId), Arc<[FanOutHit]>>>;

/// Shared state of one routing run.
#[derive(Debug)]
pub struct RoutingSession {
    config: RouterConfig,
    occupancy: RwLock<Occupancy>,
    exit_fan_out: FanOutCache,
    entrance_fan_out: FanOutCache,
    adjacency: RwLock<HashMap<TileTypeId, Arc<TileAdjacency>>>,
    sink: DiagnosticSink,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl RoutingSession {
    /// Creates a session with empty occupancy and empty caches.
    pub fn new(config: RouterConfig) -> Self {
        let sink = DiagnosticSink::with_min_severity(config.router.min_severity);
        Self {
            config,
            occupancy: RwLock::new(Occupancy::default()),
            exit_fan_out: RwLock::new(HashMap::new()),
            entrance_fan_out: RwLock::new(HashMap::new()),
            adjacency: RwLock::new(HashMap::new()),
            sink,
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
        }
    }

    /// The router configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The diagnostic sink collecting progress and problem reports.
    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Read access to the current occupancy.
    pub fn occupancy(&self) -> RwLockReadGuard<'_, Occupancy> {
        read(&self.occupancy)
    }

    /// Returns `true` if the node is in the footprint or locked.
    pub fn is_claimed(&self, node: NodeId) -> bool {
        self.occupancy().is_claimed(node)
    }

    /// Replaces the footprint of pre-existing design usage.
    pub fn set_footprint(&self, fabric: &dyn Fabric, nodes: impl IntoIterator<Item = NodeId>) {
        let mut occupancy = write(&self.occupancy);
        let old: Vec<NodeId> = occupancy.footprint.drain().collect();
        for node in old {
            occupancy.uncount_tiles(fabric, node);
        }
        for node in nodes {
            if occupancy.footprint.insert(node) {
                occupancy.count_tiles(fabric, node);
            }
        }
    }

    /// Locks every node in `nodes`, or none of them.
    ///
    /// Returns `false` without changing anything if any node is already
    /// claimed.
    pub fn try_claim(&self, fabric: &dyn Fabric, nodes: &HashSet<NodeId>) -> bool {
        let mut occupancy = write(&self.occupancy);
        if nodes.iter().any(|&n| occupancy.is_claimed(n)) {
            return false;
        }
        for &node in nodes {
            occupancy.locks.insert(node);
            occupancy.count_tiles(fabric, node);
        }
        true
    }

    /// Unlocks nodes previously claimed with [`try_claim`](Self::try_claim).
    pub fn release(&self, fabric: &dyn Fabric, nodes: &HashSet<NodeId>) {
        let mut occupancy = write(&self.occupancy);
        for &node in nodes {
            if occupancy.locks.remove(&node) {
                occupancy.uncount_tiles(fabric, node);
            }
        }
    }

    /// Number of locked nodes (footprint excluded).
    pub fn locked_count(&self) -> usize {
        self.occupancy().locks.len()
    }

    /// Returns the PIP adjacency of a tile type, building it on first use.
    pub fn adjacency(&self, fabric: &dyn Fabric, tile_type: TileTypeId) -> Arc<TileAdjacency> {
        if let Some(adjacency) = read(&self.adjacency).get(&tile_type) {
            return Arc::clone(adjacency);
        }
        let built = Arc::new(TileAdjacency::build(fabric, tile_type));
        let mut cache = write(&self.adjacency);
        Arc::clone(cache.entry(tile_type).or_insert(built))
    }

    fn fan_out_cache(&self, kind: FanOut) -> &FanOutCache {
        match kind {
            FanOut::Exit => &self.exit_fan_out,
            FanOut::Entrance => &self.entrance_fan_out,
        }
    }

    pub(crate) fn cached_fan_out(
        &self,
        kind: FanOut,
        key: (TileTypeId, WireId),
    ) -> Option<Arc<[FanOutHit]>> {
        let hit = read(self.fan_out_cache(kind)).get(&key).cloned();
        if hit.is_some() {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    pub(crate) fn store_fan_out(
        &self,
        kind: FanOut,
        key: (TileTypeId, WireId),
        hits: Vec<FanOutHit>,
    ) -> Arc<[FanOutHit]> {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        let mut cache = write(self.fan_out_cache(kind));
        Arc::clone(cache.entry(key).or_insert_with(|| hits.into()))
    }

    /// Fan-out cache counters so far.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.cache_hits.load(Ordering::Relaxed),
            misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for RoutingSession {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinew_fabric::switchbox_grid;

    fn node(fabric: &dyn Fabric, tile: &str, wire: &str) -> NodeId {
        let tile = fabric.tile_by_name(tile).unwrap();
        let wire = fabric.wire_by_name(fabric.tile_type(tile), wire).unwrap();
        fabric.node_of(tile, wire)
    }

    #[test]
    fn claim_is_all_or_nothing() {
        let fabric = switchbox_grid(3, 3);
        let session = RoutingSession::default();
        let a = node(&fabric, "INT_X0Y0", "INODE0");
        let b = node(&fabric, "INT_X0Y0", "INODE1");
        let c = node(&fabric, "INT_X1Y0", "INODE0");
        assert!(session.try_claim(&fabric, &HashSet::from([a, b])));
        assert!(!session.try_claim(&fabric, &HashSet::from([b, c])));
        assert!(!session.is_claimed(c));
        assert_eq!(session.locked_count(), 2);
    }

    #[test]
    fn release_clears_tile_touch() {
        let fabric = switchbox_grid(3, 3);
        let session = RoutingSession::default();
        let tile = fabric.tile_by_name("INT_X1Y1").unwrap();
        let n = node(&fabric, "INT_X1Y1", "INODE5");
        let claim = HashSet::from([n]);
        assert!(session.try_claim(&fabric, &claim));
        assert!(session.occupancy().touches(tile));
        session.release(&fabric, &claim);
        assert!(!session.occupancy().touches(tile));
        assert!(!session.is_claimed(n));
    }

    #[test]
    fn spans_touch_both_tiles() {
        let fabric = switchbox_grid(4, 1);
        let session = RoutingSession::default();
        let n = node(&fabric, "INT_X0Y0", "EE2BEG0");
        session.set_footprint(&fabric, [n]);
        let occupancy = session.occupancy();
        assert!(occupancy.is_claimed(n));
        assert!(occupancy.touches(fabric.tile_by_name("INT_X0Y0").unwrap()));
        assert!(occupancy.touches(fabric.tile_by_name("INT_X2Y0").unwrap()));
        assert!(!occupancy.touches(fabric.tile_by_name("INT_X1Y0").unwrap()));
    }

    #[test]
    fn footprint_blocks_claims_and_is_replaced() {
        let fabric = switchbox_grid(2, 2);
        let session = RoutingSession::default();
        let a = node(&fabric, "INT_X0Y0", "INODE0");
        let b = node(&fabric, "INT_X0Y0", "INODE1");
        session.set_footprint(&fabric, [a]);
        assert!(!session.try_claim(&fabric, &HashSet::from([a])));
        session.set_footprint(&fabric, [b]);
        assert!(!session.is_claimed(a));
        assert!(session.is_claimed(b));
        assert_eq!(session.locked_count(), 0);
    }

    #[test]
    fn adjacency_is_shared() {
        let fabric = switchbox_grid(2, 1);
        let session = RoutingSession::default();
        let tile = fabric.tile_by_name("INT_X0Y0").unwrap();
        let first = session.adjacency(&fabric, fabric.tile_type(tile));
        let second = session.adjacency(&fabric, fabric.tile_type(tile));
        assert!(Arc::ptr_eq(&first, &second));
        let inode = fabric.wire_by_name(fabric.tile_type(tile), "INODE0").unwrap();
        assert!(!first.downhill(inode).is_empty());
        assert!(!first.uphill(inode).is_empty());
    }

    #[test]
    fn racing_fills_keep_first_value() {
        let session = RoutingSession::default();
        let key = (TileTypeId::from_raw(0), WireId::from_raw(1));
        let first = session.store_fan_out(FanOut::Exit, key, vec![(WireId::from_raw(2), 1)]);
        let second = session.store_fan_out(FanOut::Exit, key, vec![(WireId::from_raw(3), 2)]);
        assert_eq!(&*first, &*second);
        assert!(session.cached_fan_out(FanOut::Entrance, key).is_none());
        assert_eq!(session.cache_stats(), CacheStats { hits: 0, misses: 2 });
    }
}
