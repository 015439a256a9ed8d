//! Detailed per-lane routes: one committed tile path per template slot.
//!
//! Slot `k` covers the tile between template junctions `2k` and `2k + 1`.
//! Each slot has a ranked [`CandidatePool`] read through a cursor, so asking
//! a slot for "the next alternative" never reorders or loses candidates and
//! reports exhaustion explicitly.

use crate::ids::NetId;
use crate::junction::{EnterWireJunction, ExitWireJunction};
use crate::netlist::{PipSelection, RoutedDesign};
use crate::template::RouteTemplate;
use crate::tile_path::TilePath;
use sinew_common::{InternalError, SinewResult};
use sinew_fabric::NodeId;
use std::collections::HashSet;
use std::sync::Arc;

/// Ranked alternatives for one slot, consumed through a cursor.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    paths: Vec<TilePath>,
    cursor: usize,
}

impl CandidatePool {
    /// Creates a pool from candidates ranked best first.
    pub fn new(paths: Vec<TilePath>) -> Self {
        Self { paths, cursor: 0 }
    }

    /// Returns the next untried candidate, or `None` once all were tried.
    pub fn advance(&mut self) -> Option<&TilePath> {
        let path = self.paths.get(self.cursor)?;
        self.cursor += 1;
        Some(path)
    }

    /// Makes every candidate untried again.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Number of candidates handed out since the last reset.
    pub fn attempted(&self) -> usize {
        self.cursor
    }

    /// Returns `true` when every candidate has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.paths.len()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if the pool has no candidates at all.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// All candidates in rank order.
    pub fn paths(&self) -> &[TilePath] {
        &self.paths
    }
}

/// The detailed realization of one template for one bus lane.
#[derive(Clone, Debug)]
pub struct CustomRoute {
    template: Arc<RouteTemplate>,
    slots: Vec<Option<TilePath>>,
    pools: Vec<CandidatePool>,
    cost: u32,
}

impl CustomRoute {
    /// Creates a route with every slot empty.
    pub fn new(template: Arc<RouteTemplate>) -> Self {
        let slot_count = template.slot_count();
        Self {
            template,
            slots: vec![None; slot_count],
            pools: vec![CandidatePool::default(); slot_count],
            cost: 0,
        }
    }

    /// The template being realized.
    pub fn template(&self) -> &Arc<RouteTemplate> {
        &self.template
    }

    /// Sum of the costs of committed slots.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// The bus bit of this lane.
    pub fn bit_index(&self) -> usize {
        self.template.bit_index()
    }

    /// The route source.
    pub fn src(&self) -> &EnterWireJunction {
        self.template.src()
    }

    /// The route sink.
    pub fn snk(&self) -> &ExitWireJunction {
        self.template.snk()
    }

    /// Column distance from source to sink.
    pub fn distance_x(&self) -> i32 {
        self.template.distance_x()
    }

    /// Row distance from source to sink.
    pub fn distance_y(&self) -> i32 {
        self.template.distance_y()
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The slots, `None` where nothing is committed.
    pub fn paths(&self) -> &[Option<TilePath>] {
        &self.slots
    }

    /// The path committed at `index`, if any.
    pub fn path(&self, index: usize) -> Option<&TilePath> {
        self.slots.get(index)?.as_ref()
    }

    /// Index of the first empty slot.
    pub fn next_blank_path_index(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Returns `true` when every slot is committed.
    pub fn is_complete(&self) -> bool {
        self.next_blank_path_index().is_none()
    }

    fn check_index(&self, index: usize) -> SinewResult<()> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(InternalError::new(format!(
                "slot {index} out of range for a route of {} slots",
                self.slots.len()
            )))
        }
    }

    /// Commits `path` into the first empty slot and returns that slot.
    pub fn set_as_next_path(&mut self, path: TilePath) -> SinewResult<usize> {
        let index = self
            .next_blank_path_index()
            .ok_or_else(|| InternalError::new("every slot is already committed"))?;
        if let Some((enter, _)) = self.template.slot_pair(index) {
            if enter.tile() != path.tile() {
                return Err(InternalError::new(format!(
                    "tile path for slot {index} is in the wrong tile"
                )));
            }
        }
        self.cost += path.cost();
        self.slots[index] = Some(path);
        Ok(index)
    }

    /// Empties every slot after `index`, subtracting their cost.
    pub fn revert(&mut self, index: usize) -> SinewResult<()> {
        self.check_index(index)?;
        for slot in &mut self.slots[index + 1..] {
            if let Some(path) = slot.take() {
                self.cost -= path.cost();
            }
        }
        Ok(())
    }

    /// Empties every slot.
    pub fn revert_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.cost = 0;
    }

    /// Installs the ranked candidates of slot `index`.
    pub fn set_path_candidates(&mut self, index: usize, paths: Vec<TilePath>) -> SinewResult<()> {
        self.check_index(index)?;
        self.pools[index] = CandidatePool::new(paths);
        Ok(())
    }

    /// Makes all candidates of slot `index` untried again.
    pub fn reset_candidates(&mut self, index: usize) -> SinewResult<()> {
        self.check_index(index)?;
        self.pools[index].reset();
        Ok(())
    }

    /// The candidate pool of slot `index`.
    pub fn candidates(&self, index: usize) -> Option<&CandidatePool> {
        self.pools.get(index)
    }

    /// The next untried candidate for the first empty slot.
    pub fn next_possible_path(&mut self) -> Option<&TilePath> {
        let index = self.next_blank_path_index()?;
        self.pools[index].advance()
    }

    /// The next untried candidate for slot `index`.
    pub fn next_possible_path_at(&mut self, index: usize) -> SinewResult<Option<&TilePath>> {
        self.check_index(index)?;
        Ok(self.pools[index].advance())
    }

    /// Every node used by committed slots.
    pub fn usage(&self) -> HashSet<NodeId> {
        self.slots
            .iter()
            .flatten()
            .flat_map(|path| path.nodes().iter().copied())
            .collect()
    }

    /// The PIPs of all committed slots in route order.
    pub fn pips(&self) -> Vec<PipSelection> {
        self.slots
            .iter()
            .flatten()
            .flat_map(|path| path.pips())
            .map(|(src, dst)| PipSelection {
                tile: src.tile,
                src: src.wire,
                dst: dst.wire,
            })
            .collect()
    }

    /// Writes the route's PIPs into `net`. Fails unless every slot is committed.
    pub fn commit_to_net(&self, design: &mut RoutedDesign, net: NetId) -> SinewResult<()> {
        if let Some(blank) = self.next_blank_path_index() {
            return Err(InternalError::new(format!(
                "cannot commit a route with slot {blank} empty"
            )));
        }
        design.commit_pips(net, self.pips())
    }
}
