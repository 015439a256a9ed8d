//! Detail realization: fill every slot of a route by backtracking search.
//!
//! Slots are filled front to back from their candidate pools. A candidate is
//! skipped when it reuses a node committed by an earlier slot or claimed in
//! the session. When a slot runs out of candidates the previous slot is
//! reopened and advanced to its next alternative.

use crate::browser::FabricBrowser;
use crate::custom_route::CustomRoute;
use crate::tile_path::TilePath;
use sinew_common::{InternalError, SinewResult};
use sinew_diagnostics::{Category, Diagnostic, DiagnosticCode};
use sinew_fabric::NodeId;
use std::collections::HashSet;

/// Warning emitted when backtracking gives up.
pub const BACKTRACK_BUDGET: DiagnosticCode = DiagnosticCode::new(Category::Warning, 102);

/// How a realization attempt ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RealizeOutcome {
    /// Every slot is committed.
    Realized,
    /// Slot `slot` has no intra-tile path at all.
    Infeasible {
        /// The slot without candidates.
        slot: usize,
    },
    /// Every combination was tried, or the backtrack budget ran out.
    Exhausted,
}

/// Fills every slot of `route`.
///
/// Existing commitments are discarded first. At most `max_backtracks` slot
/// reverts are made before giving up.
pub fn realize(
    route: &mut CustomRoute,
    browser: &FabricBrowser<'_>,
    max_backtracks: usize,
) -> SinewResult<RealizeOutcome> {
    route.revert_all();
    let template = route.template().clone();
    for slot in 0..route.slot_count() {
        let (enter, exit) = template
            .slot_pair(slot)
            .ok_or_else(|| InternalError::new(format!("template slot {slot} is malformed")))?;
        let paths = browser.find_tile_paths(&enter, &exit);
        if paths.is_empty() {
            return Ok(RealizeOutcome::Infeasible { slot });
        }
        route.set_path_candidates(slot, paths)?;
    }

    let session = browser.session();
    let mut backtracks = 0;
    while let Some(slot) = route.next_blank_path_index() {
        let used = route.usage();
        let mut chosen: Option<TilePath> = None;
        while let Some(candidate) = route.next_possible_path_at(slot)? {
            if is_free(candidate, &used, |n| session.is_claimed(n)) {
                chosen = Some(candidate.clone());
                break;
            }
        }

        match chosen {
            Some(path) => {
                route.set_as_next_path(path)?;
            }
            None if slot == 0 => return Ok(RealizeOutcome::Exhausted),
            None => {
                backtracks += 1;
                if backtracks > max_backtracks {
                    session.sink().emit(
                        Diagnostic::warning(
                            BACKTRACK_BUDGET,
                            format!(
                                "gave up realizing {} after {max_backtracks} backtracks",
                                template.hop_summary()
                            ),
                        )
                        .with_help("raise search.max_backtracks in sinew.toml"),
                    );
                    return Ok(RealizeOutcome::Exhausted);
                }
                route.reset_candidates(slot)?;
                if slot == 1 {
                    route.revert_all();
                } else {
                    route.revert(slot - 2)?;
                }
            }
        }
    }
    Ok(RealizeOutcome::Realized)
}

/// A candidate may share only its entering node with earlier slots; that
/// node is the far end of the previous slot's exit wire.
fn is_free(
    candidate: &TilePath,
    used: &HashSet<NodeId>,
    claimed: impl Fn(NodeId) -> bool,
) -> bool {
    candidate.nodes()[1..]
        .iter()
        .all(|&n| !used.contains(&n) && !claimed(n))
}
