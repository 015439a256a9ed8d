//! Route templates: long-haul skeletons with incrementally maintained cost.
//!
//! A template is the junction sequence
//! `[src, exit, enter, exit, enter, ..., snk]`. Index 0 is the route source
//! (an enter junction) and the last index is the sink (an exit junction).
//! Each `(exit, enter)` pair at indices `(2k - 1, 2k)` is one long-haul hop;
//! each `(enter, exit)` pair at `(2k, 2k + 1)` is one tile the route crosses
//! and becomes one slot of a [`CustomRoute`](crate::CustomRoute).
//!
//! Templates grow from the sink backwards: every hop is pushed at the front,
//! right after the source.

use crate::junction::{EnterWireJunction, ExitWireJunction, WireJunction};
use sinew_common::{InternalError, SinewResult};
use sinew_config::CostConfig;
use sinew_fabric::{Direction, Fabric, NodeId};
use std::collections::HashSet;

/// A skeleton route between a source and a sink.
#[derive(Clone, Debug)]
pub struct RouteTemplate {
    junctions: Vec<WireJunction>,
    src: EnterWireJunction,
    snk: ExitWireJunction,
    base_cost: u32,
    adjusted_cost: u32,
    orthogonal_turns: u32,
    last_direction: Option<Direction>,
    bit_index: usize,
    distance_x: i32,
    distance_y: i32,
    weights: CostConfig,
}

impl RouteTemplate {
    /// Creates the hop-less template `[src, snk]`.
    pub fn new(
        fabric: &dyn Fabric,
        src: EnterWireJunction,
        snk: ExitWireJunction,
        weights: &CostConfig,
    ) -> Self {
        let (sx, sy) = fabric.tile_coords(src.tile());
        let (tx, ty) = fabric.tile_coords(snk.tile());
        Self {
            junctions: vec![src.into(), snk.into()],
            src,
            snk,
            base_cost: 0,
            adjusted_cost: 0,
            orthogonal_turns: 0,
            last_direction: None,
            bit_index: 0,
            distance_x: tx - sx,
            distance_y: ty - sy,
            weights: weights.clone(),
        }
    }

    /// The junction sequence.
    pub fn junctions(&self) -> &[WireJunction] {
        &self.junctions
    }

    /// Number of junctions.
    pub fn len(&self) -> usize {
        self.junctions.len()
    }

    /// Always `false`; a template holds at least its source and sink.
    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    /// Number of long-haul hops.
    pub fn hop_count(&self) -> usize {
        (self.junctions.len() - 2) / 2
    }

    /// Number of tiles crossed, i.e. slots of a detailed route.
    pub fn slot_count(&self) -> usize {
        self.junctions.len() / 2
    }

    /// The `(enter, exit)` pair of slot `slot`.
    pub fn slot_pair(&self, slot: usize) -> Option<(EnterWireJunction, ExitWireJunction)> {
        let enter = self.junctions.get(2 * slot)?.as_enter()?;
        let exit = self.junctions.get(2 * slot + 1)?.as_exit()?;
        Some((*enter, *exit))
    }

    /// The exit junction the next pushed hop must feed.
    pub fn head(&self) -> Option<&ExitWireJunction> {
        self.junctions.get(1)?.as_exit()
    }

    /// The route source.
    pub fn src(&self) -> &EnterWireJunction {
        &self.src
    }

    /// The route sink.
    pub fn snk(&self) -> &ExitWireJunction {
        &self.snk
    }

    /// Sum of hop costs and attached tile-path costs.
    pub fn base_cost(&self) -> u32 {
        self.base_cost
    }

    /// Base cost plus short-hop, reversal, and turn penalties.
    pub fn adjusted_cost(&self) -> u32 {
        self.adjusted_cost
    }

    /// Number of 90-degree turns along the route.
    pub fn orthogonal_turns(&self) -> u32 {
        self.orthogonal_turns
    }

    /// The bus bit this template routes.
    pub fn bit_index(&self) -> usize {
        self.bit_index
    }

    /// Sets the bus bit this template routes.
    pub fn set_bit_index(&mut self, bit_index: usize) {
        self.bit_index = bit_index;
    }

    /// Column distance from source tile to sink tile.
    pub fn distance_x(&self) -> i32 {
        self.distance_x
    }

    /// Row distance from source tile to sink tile.
    pub fn distance_y(&self) -> i32 {
        self.distance_y
    }

    /// Prepends the hop arriving at `enter`.
    ///
    /// `enter` must be in the head's tile. Its driving exit junction is
    /// inserted with it, so the template becomes
    /// `[src, enter.source, enter, head, ...]`.
    pub fn push_enter_wire_junction(
        &mut self,
        fabric: &dyn Fabric,
        enter: EnterWireJunction,
    ) -> SinewResult<()> {
        let exit = enter.source_junction(fabric).ok_or_else(|| {
            InternalError::new(format!(
                "{} is not driven from another tile",
                enter.describe(fabric)
            ))
        })?;
        debug_assert_ne!(Some(enter.node()), self.head().map(|h| h.node()));
        self.junctions.insert(1, enter.into());
        self.junctions.insert(1, exit.into());
        self.add_hop(&enter, &exit);
        Ok(())
    }

    fn add_hop(&mut self, enter: &EnterWireJunction, exit: &ExitWireJunction) {
        let w = &self.weights;
        let base = w.hop + enter.tile_path_cost().unwrap_or(0) + exit.tile_path_cost().unwrap_or(0);
        let mut penalty = 0;
        if enter.length() < w.long_line_length {
            penalty += w.short_hop_penalty;
        }
        if let (Some(dir), Some(last)) = (enter.direction(), self.last_direction) {
            if dir.reverse() == last {
                penalty += w.reversal_penalty;
            } else if dir.is_orthogonal(last) {
                penalty += w.orthogonal_turn_penalty;
                self.orthogonal_turns += 1;
            }
        }
        self.last_direction = enter.direction();
        self.base_cost += base;
        self.adjusted_cost += base + penalty;
    }

    /// Replaces the stretch from `enter` to `exit` with `replacement`.
    ///
    /// `replacement` must itself run from `enter` to `exit`. Costs are
    /// recomputed over the whole new sequence.
    pub fn replace_template(
        &mut self,
        enter: &EnterWireJunction,
        exit: &ExitWireJunction,
        replacement: &RouteTemplate,
    ) -> SinewResult<()> {
        if replacement.src != *enter || replacement.snk != *exit {
            return Err(InternalError::new(
                "replacement does not run between the replaced junctions",
            ));
        }
        let start = self
            .junctions
            .iter()
            .position(|j| j.as_enter() == Some(enter))
            .ok_or_else(|| InternalError::new("replaced enter junction is not in the template"))?;
        let end = self.junctions[start..]
            .iter()
            .position(|j| j.as_exit() == Some(exit))
            .map(|offset| start + offset)
            .ok_or_else(|| InternalError::new("replaced exit junction does not follow the enter"))?;

        self.junctions
            .splice(start..=end, replacement.junctions.iter().copied());
        self.recompute()
    }

    fn recompute(&mut self) -> SinewResult<()> {
        self.base_cost = 0;
        self.adjusted_cost = 0;
        self.orthogonal_turns = 0;
        self.last_direction = None;
        let mut i = self.junctions.len().saturating_sub(2);
        while i >= 2 {
            let pair = (self.junctions[i].as_enter(), self.junctions[i - 1].as_exit());
            let (enter, exit) = match pair {
                (Some(enter), Some(exit)) => (*enter, *exit),
                _ => {
                    return Err(InternalError::new(format!(
                        "template junctions out of order at index {i}"
                    )))
                }
            };
            self.add_hop(&enter, &exit);
            i -= 2;
        }
        Ok(())
    }

    /// Returns this template translated by `(dx, dy)` tiles.
    ///
    /// Returns `None` if any junction falls off the grid.
    pub fn copy_with_offset(&self, fabric: &dyn Fabric, dx: i32, dy: i32) -> Option<Self> {
        let junctions = self
            .junctions
            .iter()
            .map(|j| j.copy_with_offset(fabric, dx, dy))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            junctions,
            src: self.src.copy_with_offset(fabric, dx, dy)?,
            snk: self.snk.copy_with_offset(fabric, dx, dy)?,
            weights: self.weights.clone(),
            ..*self
        })
    }

    /// Every node the template's junctions sit on.
    pub fn usage(&self) -> HashSet<NodeId> {
        self.junctions.iter().map(WireJunction::node).collect()
    }

    /// Compact hop list, e.g. `<E6 E6 N2>[14]`.
    pub fn hop_summary(&self) -> String {
        let hops: Vec<String> = (1..=self.hop_count())
            .filter_map(|k| self.junctions[2 * k].as_enter())
            .map(|enter| {
                let dir = enter.direction().map_or("-", Direction::short_name);
                format!("{dir}{}", enter.length())
            })
            .collect();
        format!("<{}>[{}]", hops.join(" "), self.adjusted_cost)
    }

    /// Lists every junction as `TILE/WIRE`, joined by arrows.
    pub fn describe(&self, fabric: &dyn Fabric) -> String {
        let parts: Vec<String> = self.junctions.iter().map(|j| j.describe(fabric)).collect();
        parts.join(" --> ")
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

    fn template(fabric: &GridFabric, src: &str, snk: &str) -> RouteTemplate {
        RouteTemplate::new(
            fabric,
            enter(fabric, src, "LOGIC_OUT0"),
            exit(fabric, snk, "IMUX0"),
            &CostConfig::default(),
        )
    }

    #[test]
    fn new_template_is_src_and_snk() {
        let fabric = switchbox_grid(4, 4);
        let t = template(&fabric, "INT_X0Y1", "INT_X3Y3");
        assert_eq!(t.len(), 2);
        assert_eq!(t.slot_count(), 1);
        assert_eq!(t.hop_count(), 0);
        assert_eq!((t.distance_x(), t.distance_y()), (3, 2));
        assert_eq!(t.adjusted_cost(), 0);
        assert_eq!(t.hop_summary(), "<>[0]");
    }

    #[test]
    fn long_hop_costs_base_only() {
        let fabric = switchbox_grid(8, 1);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X6Y0");
        t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X6Y0", "EE6END0"))
            .unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.base_cost(), 2);
        assert_eq!(t.adjusted_cost(), 2);
        assert_eq!(t.hop_summary(), "<E6>[2]");
        let (e, x) = t.slot_pair(0).unwrap();
        assert_eq!(e, *t.src());
        assert_eq!(x.describe(&fabric), "INT_X0Y0/EE6BEG0");
    }

    #[test]
    fn short_hops_pay_penalty_and_cost_never_drops() {
        let fabric = switchbox_grid(4, 1);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X2Y0");
        let mut previous = t.adjusted_cost();
        for tile in ["INT_X2Y0", "INT_X1Y0"] {
            t.push_enter_wire_junction(&fabric, enter(&fabric, tile, "EE1END0"))
                .unwrap();
            assert!(t.adjusted_cost() >= previous + CostConfig::default().short_hop_penalty);
            previous = t.adjusted_cost();
        }
        assert_eq!(t.adjusted_cost(), 12);
        assert_eq!(t.orthogonal_turns(), 0);
    }

    #[test]
    fn orthogonal_turn_is_counted() {
        let fabric = switchbox_grid(3, 3);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X1Y1");
        t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X1Y1", "NN1END0"))
            .unwrap();
        t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X1Y0", "EE1END0"))
            .unwrap();
        assert_eq!(t.base_cost(), 4);
        assert_eq!(t.adjusted_cost(), 6 + 14);
        assert_eq!(t.orthogonal_turns(), 1);
        assert_eq!(t.hop_summary(), "<E1 N1>[20]");
    }

    #[test]
    fn reversal_is_penalized() {
        let fabric = switchbox_grid(3, 1);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X1Y0");
        t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X1Y0", "WW1END0"))
            .unwrap();
        t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X2Y0", "EE1END0"))
            .unwrap();
        assert_eq!(t.adjusted_cost(), 6 + 8);
        assert_eq!(t.orthogonal_turns(), 0);
    }

    #[test]
    fn tile_path_costs_add_to_base() {
        let fabric = switchbox_grid(8, 1);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X6Y0");
        let e = enter(&fabric, "INT_X6Y0", "EE6END0").with_tile_path_cost(3);
        t.push_enter_wire_junction(&fabric, e).unwrap();
        assert_eq!(t.base_cost(), 5);
        assert_eq!(t.adjusted_cost(), 5);
    }

    #[test]
    fn undriven_enter_is_rejected() {
        let fabric = switchbox_grid(2, 2);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X0Y0");
        let result = t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X0Y0", "EE1END0"));
        assert!(result.is_err());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn replace_splices_detour_and_recomputes() {
        let fabric = switchbox_grid(4, 3);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X2Y0");
        let e = enter(&fabric, "INT_X2Y0", "EE2END0");
        t.push_enter_wire_junction(&fabric, e).unwrap();

        let snk = *t.snk();
        let mut detour = RouteTemplate::new(&fabric, e, snk, &CostConfig::default());
        detour
            .push_enter_wire_junction(&fabric, enter(&fabric, "INT_X2Y0", "SS1END0"))
            .unwrap();
        detour
            .push_enter_wire_junction(&fabric, enter(&fabric, "INT_X2Y1", "NN1END0"))
            .unwrap();
        assert_eq!(detour.adjusted_cost(), 14);

        t.replace_template(&e, &snk, &detour).unwrap();
        assert_eq!(t.len(), 8);
        assert_eq!(t.base_cost(), 6);
        assert_eq!(t.adjusted_cost(), 28);
        assert_eq!(t.orthogonal_turns(), 1);
        assert_eq!(t.hop_summary(), "<E2 N1 S1>[28]");
        for slot in 0..t.slot_count() {
            let (e, x) = t.slot_pair(slot).unwrap();
            assert_eq!(e.tile(), x.tile());
        }
    }

    #[test]
    fn replace_requires_matching_pair() {
        let fabric = switchbox_grid(4, 1);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X2Y0");
        let stray = enter(&fabric, "INT_X3Y0", "WW1END0");
        let snk = *t.snk();
        let other = RouteTemplate::new(&fabric, stray, snk, &CostConfig::default());
        assert!(t.replace_template(&stray, &snk, &other).is_err());
    }

    #[test]
    fn offset_copy_keeps_shape_and_cost() {
        let fabric = switchbox_grid(8, 3);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X6Y0");
        t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X6Y0", "EE6END0"))
            .unwrap();
        t.set_bit_index(0);
        let mut moved = t.copy_with_offset(&fabric, 1, 2).unwrap();
        moved.set_bit_index(1);
        assert_eq!(moved.adjusted_cost(), t.adjusted_cost());
        assert_eq!(moved.src().describe(&fabric), "INT_X1Y2/LOGIC_OUT0");
        assert_eq!(moved.snk().describe(&fabric), "INT_X7Y2/IMUX0");
        assert_eq!(moved.bit_index(), 1);
        assert!(t.copy_with_offset(&fabric, 2, 0).is_none());
    }

    #[test]
    fn usage_and_description() {
        let fabric = switchbox_grid(8, 1);
        let mut t = template(&fabric, "INT_X0Y0", "INT_X6Y0");
        t.push_enter_wire_junction(&fabric, enter(&fabric, "INT_X6Y0", "EE6END0"))
            .unwrap();
        // The hop's exit and enter share one node.
        assert_eq!(t.usage().len(), 3);
        assert_eq!(
            t.describe(&fabric),
            "INT_X0Y0/LOGIC_OUT0 --> INT_X0Y0/EE6BEG0 --> INT_X6Y0/EE6END0 --> INT_X6Y0/IMUX0"
        );
    }
}
