//! Skeleton search: build a route template by chaining exit fan-outs.
//!
//! The search runs backwards from the sink. Each partial template's head is
//! the exit junction the next hop must feed; expanding it asks the browser
//! for the enter junctions that reach the head and pushes one hop per enter.
//! Every pushed hop carries the approach cost reported by the exit fan-out,
//! the PIP count from the hop's enter wire to the head inside its tile.
//! Partial templates are ordered by adjusted cost plus an estimate of the
//! hops still needed to reach the source tile, so the first template to reach
//! the source tile with a viable intra-tile path is the cheapest found.

use crate::browser::FabricBrowser;
use crate::junction::{EnterWireJunction, ExitWireJunction};
use crate::template::RouteTemplate;
use sinew_common::{InternalError, SinewResult};
use sinew_config::RouterConfig;
use sinew_diagnostics::{Category, Diagnostic, DiagnosticCode};
use sinew_fabric::{Fabric, NodeId};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Note emitted when a template is found.
pub const TEMPLATE_FOUND: DiagnosticCode = DiagnosticCode::new(Category::Routing, 2);

/// Warning emitted when the search gives up on its expansion budget.
pub const SKELETON_BUDGET: DiagnosticCode = DiagnosticCode::new(Category::Warning, 101);

/// A partial template in the search frontier.
#[derive(Debug)]
struct SkeletonState {
    template: RouteTemplate,
    /// Adjusted cost plus the remaining-distance estimate.
    estimated_total: u32,
    /// Insertion order; earlier entries win ties.
    order: usize,
}

impl PartialEq for SkeletonState {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_total == other.estimated_total && self.order == other.order
    }
}

impl Eq for SkeletonState {}

impl Ord for SkeletonState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default)
        other
            .estimated_total
            .cmp(&self.estimated_total)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for SkeletonState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lower bound on the cost of covering the distance from `head` to `src`.
fn heuristic(
    fabric: &dyn Fabric,
    config: &RouterConfig,
    head: &ExitWireJunction,
    src: &EnterWireJunction,
) -> u32 {
    let (hx, hy) = fabric.tile_coords(head.tile());
    let (sx, sy) = fabric.tile_coords(src.tile());
    let distance = (hx - sx).unsigned_abs() + (hy - sy).unsigned_abs();
    distance.div_ceil(config.cost.long_line_length.max(1)) * config.cost.hop
}

/// Finds the cheapest template from `src` to `snk`.
///
/// Returns `None` when no template exists within `search.max_template_hops`
/// hops, or when `search.max_expansions` partial templates were expanded
/// without success (reported as a warning).
pub fn find_template(
    browser: &FabricBrowser<'_>,
    src: &EnterWireJunction,
    snk: &ExitWireJunction,
    bit_index: usize,
) -> Option<RouteTemplate> {
    search(browser, src, snk, bit_index, &HashSet::new())
}

fn search(
    browser: &FabricBrowser<'_>,
    src: &EnterWireJunction,
    snk: &ExitWireJunction,
    bit_index: usize,
    avoid: &HashSet<NodeId>,
) -> Option<RouteTemplate> {
    let fabric = browser.fabric();
    let session = browser.session();
    let config = session.config();

    let mut start = RouteTemplate::new(fabric, *src, *snk, &config.cost);
    start.set_bit_index(bit_index);

    let mut open = BinaryHeap::new();
    let mut closed: HashSet<NodeId> = HashSet::new();
    let mut order = 0;
    let mut expansions = 0;
    open.push(SkeletonState {
        estimated_total: heuristic(fabric, config, snk, src),
        template: start,
        order,
    });

    while let Some(SkeletonState { template, .. }) = open.pop() {
        let head = match template.head() {
            Some(head) => *head,
            None => continue,
        };
        if !closed.insert(head.node()) {
            continue; // Already expanded more cheaply
        }

        if head.tile() == src.tile() && browser.is_path_possible(src, &head) {
            session.sink().emit(
                Diagnostic::note(
                    TEMPLATE_FOUND,
                    format!(
                        "found template for {} --> {}",
                        src.describe(fabric),
                        snk.describe(fabric)
                    ),
                )
                .with_note(template.hop_summary()),
            );
            return Some(template);
        }
        if template.hop_count() >= config.search.max_template_hops {
            continue;
        }

        expansions += 1;
        if expansions > config.search.max_expansions {
            session.sink().emit(
                Diagnostic::warning(
                    SKELETON_BUDGET,
                    format!(
                        "no template for {} --> {} within {} expansions",
                        src.describe(fabric),
                        snk.describe(fabric),
                        config.search.max_expansions
                    ),
                )
                .with_help("raise search.max_expansions in sinew.toml"),
            );
            return None;
        }

        let used = template.usage();
        for enter in browser.exit_fan_out(&head) {
            let upstream = match enter.source_junction(fabric) {
                Some(upstream) => upstream,
                None => continue,
            };
            let node = upstream.node();
            if used.contains(&node) || avoid.contains(&node) || closed.contains(&node) {
                continue;
            }
            let mut next = template.clone();
            if next.push_enter_wire_junction(fabric, enter).is_err() {
                continue;
            }
            order += 1;
            open.push(SkeletonState {
                estimated_total: next.adjusted_cost() + heuristic(fabric, config, &upstream, src),
                template: next,
                order,
            });
        }
    }
    None
}

/// Replaces slot `slot` of `template` with a detour if its tile has no path.
///
/// Returns `Ok(true)` if the template changed. Returns `Ok(false)` when the
/// slot already has a path or no detour exists.
pub fn refine_hop(
    browser: &FabricBrowser<'_>,
    template: &mut RouteTemplate,
    slot: usize,
) -> SinewResult<bool> {
    let (enter, exit) = template
        .slot_pair(slot)
        .ok_or_else(|| InternalError::new(format!("slot {slot} out of range for refinement")))?;
    if browser.is_path_possible(&enter, &exit) {
        return Ok(false);
    }
    let avoid = template.usage();
    match search(browser, &enter, &exit, template.bit_index(), &avoid) {
        Some(detour) => {
            template.replace_template(&enter, &exit, &detour)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
