//! Connection routing: skeleton search, detail realization, and job fan-out.
//!
//! A [`Connection`] is a bus of bit lanes. Connections are routed in
//! parallel on a pool of `router.jobs` threads; the lanes of one connection
//! are routed in order so later lanes can reuse the first lane's template,
//! shifted by the lanes' grid offset. Every realized lane claims its nodes in
//! the session before it counts as routed, and PIPs are written into the
//! design only after all jobs have finished.

pub mod detail;
pub mod skeleton;

pub use detail::{realize, RealizeOutcome, BACKTRACK_BUDGET};
pub use skeleton::{find_template, refine_hop, SKELETON_BUDGET, TEMPLATE_FOUND};

use crate::browser::FabricBrowser;
use crate::custom_route::CustomRoute;
use crate::ids::NetId;
use crate::junction::{EnterWireJunction, ExitWireJunction};
use crate::netlist::RoutedDesign;
use crate::session::RoutingSession;
use crate::template::RouteTemplate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sinew_common::{InternalError, SinewResult};
use sinew_diagnostics::{Category, Diagnostic, DiagnosticCode};
use sinew_fabric::{Fabric, NodeId, TileWire};
use std::collections::HashSet;
use std::sync::Arc;

/// Error emitted for every lane that could not be routed.
pub const UNROUTABLE: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);

/// One bit of a connection: a source pin and a sink pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Lane {
    /// The driving pin.
    pub src: TileWire,
    /// The driven pin.
    pub snk: TileWire,
}

/// A named bus of lanes routed together.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connection {
    /// Bus name; lane `i` becomes net `name[i]`.
    pub name: String,
    /// The lanes, bit 0 first.
    pub lanes: Vec<Lane>,
}

impl Connection {
    /// Creates a connection without lanes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lanes: Vec::new(),
        }
    }

    /// Appends a lane.
    pub fn with_lane(mut self, src: TileWire, snk: TileWire) -> Self {
        self.lanes.push(Lane { src, snk });
        self
    }

    /// Net name of lane `bit`.
    pub fn net_name(&self, bit: usize) -> String {
        format!("{}[{bit}]", self.name)
    }
}

/// How one lane ended.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LaneOutcome {
    /// The lane is routed and committed.
    Routed {
        /// Sum of the lane's tile-path costs.
        cost: u32,
        /// Adjusted cost of the lane's template.
        template_cost: u32,
        /// Long-haul hops in the template.
        hops: usize,
        /// `true` if the template was copied from the connection's first lane.
        reused_template: bool,
    },
    /// The lane could not be routed.
    Unroutable {
        /// Why the last attempt failed.
        reason: String,
    },
}

/// Outcome of one lane.
#[derive(Clone, Debug)]
pub struct LaneReport {
    /// Connection name.
    pub connection: String,
    /// Bit index within the connection.
    pub bit: usize,
    /// The lane's net.
    pub net: NetId,
    /// What happened.
    pub outcome: LaneOutcome,
}

/// Per-lane outcomes of a routing run.
#[derive(Clone, Debug, Default)]
pub struct RoutingReport {
    /// One entry per lane, in connection order.
    pub lanes: Vec<LaneReport>,
}

impl RoutingReport {
    /// Number of routed lanes.
    pub fn routed_count(&self) -> usize {
        self.lanes
            .iter()
            .filter(|l| matches!(l.outcome, LaneOutcome::Routed { .. }))
            .count()
    }

    /// Number of unroutable lanes.
    pub fn failed_count(&self) -> usize {
        self.lanes.len() - self.routed_count()
    }

    /// Returns `true` if every lane was routed.
    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0
    }
}

#[derive(Debug)]
enum LaneAttempt {
    Routed {
        route: CustomRoute,
        reused_template: bool,
    },
    Failed(String),
}

/// Routes connections against one fabric within one session.
#[derive(Clone, Copy, Debug)]
pub struct Router<'a> {
    fabric: &'a dyn Fabric,
    session: &'a RoutingSession,
}

impl<'a> Router<'a> {
    /// Creates a router.
    pub fn new(fabric: &'a dyn Fabric, session: &'a RoutingSession) -> Self {
        Self { fabric, session }
    }

    /// Routes every lane of every connection and commits the results.
    ///
    /// Unroutable lanes are reported in the returned [`RoutingReport`] and as
    /// `E201` diagnostics; `Err` means an internal invariant broke or two
    /// connections share a name.
    pub fn route(
        &self,
        connections: &[Connection],
        design: &mut RoutedDesign,
    ) -> SinewResult<RoutingReport> {
        let mut names = HashSet::with_capacity(connections.len());
        for connection in connections {
            if !names.insert(connection.name.as_str()) {
                return Err(InternalError::new(format!(
                    "connection `{}` is requested more than once",
                    connection.name
                )));
            }
        }

        let nets: Vec<Vec<NetId>> = connections
            .iter()
            .map(|c| (0..c.lanes.len()).map(|bit| design.add_net(c.net_name(bit))).collect())
            .collect();

        let jobs = self.session.config().router.jobs.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| InternalError::new(format!("cannot start {jobs} routing jobs: {e}")))?;
        let results: Vec<Vec<LaneAttempt>> = pool.install(|| {
            connections
                .par_iter()
                .map(|c| self.route_connection(c))
                .collect::<SinewResult<Vec<_>>>()
        })?;

        let mut report = RoutingReport::default();
        for ((connection, nets), attempts) in connections.iter().zip(&nets).zip(results) {
            for (bit, attempt) in attempts.into_iter().enumerate() {
                let net = nets[bit];
                let outcome = match attempt {
                    LaneAttempt::Routed {
                        route,
                        reused_template,
                    } => {
                        route.commit_to_net(design, net)?;
                        LaneOutcome::Routed {
                            cost: route.cost(),
                            template_cost: route.template().adjusted_cost(),
                            hops: route.template().hop_count(),
                            reused_template,
                        }
                    }
                    LaneAttempt::Failed(reason) => {
                        self.session.sink().emit(
                            Diagnostic::error(
                                UNROUTABLE,
                                format!("lane {} is unroutable", connection.net_name(bit)),
                            )
                            .with_note(reason.clone()),
                        );
                        LaneOutcome::Unroutable { reason }
                    }
                };
                report.lanes.push(LaneReport {
                    connection: connection.name.clone(),
                    bit,
                    net,
                    outcome,
                });
            }
        }
        Ok(report)
    }

    fn route_connection(&self, connection: &Connection) -> SinewResult<Vec<LaneAttempt>> {
        let browser = FabricBrowser::new(self.fabric, self.session);
        let mut lead: Option<Arc<RouteTemplate>> = None;
        let mut attempts = Vec::with_capacity(connection.lanes.len());
        for (bit, lane) in connection.lanes.iter().enumerate() {
            let src = EnterWireJunction::at(self.fabric, lane.src);
            let snk = ExitWireJunction::at(self.fabric, lane.snk);
            let reused = lead
                .as_ref()
                .and_then(|t| self.shifted_template(t, &src, &snk, bit));
            let attempt = self.route_lane(&browser, &src, &snk, bit, reused)?;
            if lead.is_none() {
                if let LaneAttempt::Routed { route, .. } = &attempt {
                    lead = Some(Arc::clone(route.template()));
                }
            }
            attempts.push(attempt);
        }
        Ok(attempts)
    }

    /// Copies `lead` onto a lane whose pins sit at the same relative spot.
    fn shifted_template(
        &self,
        lead: &RouteTemplate,
        src: &EnterWireJunction,
        snk: &ExitWireJunction,
        bit: usize,
    ) -> Option<RouteTemplate> {
        let (lx, ly) = self.fabric.tile_coords(lead.src().tile());
        let (sx, sy) = self.fabric.tile_coords(src.tile());
        let mut copy = lead.copy_with_offset(self.fabric, sx - lx, sy - ly)?;
        if copy.src() != src || copy.snk() != snk {
            return None;
        }
        copy.set_bit_index(bit);
        Some(copy)
    }

    fn route_lane(
        &self,
        browser: &FabricBrowser<'_>,
        src: &EnterWireJunction,
        snk: &ExitWireJunction,
        bit: usize,
        reused: Option<RouteTemplate>,
    ) -> SinewResult<LaneAttempt> {
        let claim = |nodes: &HashSet<NodeId>| self.session.try_claim(self.fabric, nodes);
        self.route_lane_with(browser, src, snk, bit, reused, claim)
    }

    /// Realizes one lane, locking its nodes through `claim`.
    ///
    /// A lost claim or a failed realization starts a new attempt with a
    /// fresh skeleton search, up to `search.max_claim_attempts` attempts.
    fn route_lane_with(
        &self,
        browser: &FabricBrowser<'_>,
        src: &EnterWireJunction,
        snk: &ExitWireJunction,
        bit: usize,
        mut reused: Option<RouteTemplate>,
        mut claim: impl FnMut(&HashSet<NodeId>) -> bool,
    ) -> SinewResult<LaneAttempt> {
        let search = &self.session.config().search;
        let mut failure = String::from("no routing attempt was made");
        for _ in 0..search.max_claim_attempts.max(1) {
            let reused_template = reused.is_some();
            let mut template = match reused.take() {
                Some(template) => template,
                None => match find_template(browser, src, snk, bit) {
                    Some(template) => template,
                    None => {
                        return Ok(LaneAttempt::Failed(format!(
                            "no template from {} to {}",
                            src.describe(self.fabric),
                            snk.describe(self.fabric)
                        )))
                    }
                },
            };

            let mut route = CustomRoute::new(Arc::new(template.clone()));
            let mut outcome = realize(&mut route, browser, search.max_backtracks)?;
            if let RealizeOutcome::Infeasible { slot } = outcome {
                if refine_hop(browser, &mut template, slot)? {
                    route = CustomRoute::new(Arc::new(template));
                    outcome = realize(&mut route, browser, search.max_backtracks)?;
                }
            }

            match outcome {
                RealizeOutcome::Realized => {
                    if claim(&route.usage()) {
                        return Ok(LaneAttempt::Routed {
                            route,
                            reused_template,
                        });
                    }
                    failure = "resources were claimed by another job".to_string();
                }
                RealizeOutcome::Infeasible { slot } => {
                    failure = format!(
                        "no intra-tile path for slot {slot} of {}",
                        route.template().hop_summary()
                    );
                }
                RealizeOutcome::Exhausted => {
                    failure = format!(
                        "every tile-path combination of {} collides",
                        route.template().hop_summary()
                    );
                }
            }
        }
        Ok(LaneAttempt::Failed(failure))
    }
}
