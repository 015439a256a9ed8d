//! The Sinew routing engine.
//!
//! Routing a connection happens in two stages. A *skeleton* search chains
//! long-haul hops into a [`RouteTemplate`], ranked by a cost model that
//! favors long wires and penalizes reversals and turns. *Detail*
//! realization then turns each tile the template crosses into a concrete
//! [`TilePath`], backtracking over ranked alternatives when paths collide.
//!
//! All searches run through a [`FabricBrowser`], which shares fan-out
//! caches and node occupancy through a [`RoutingSession`].
//!
//! ```
//! use sinew_fabric::{switchbox_grid, Fabric};
//! use sinew_route::{Connection, RoutedDesign, Router, RoutingSession};
//!
//! let fabric = switchbox_grid(8, 8);
//! let session = RoutingSession::default();
//! let src = fabric.tile_wire("INT_X0Y0", "LOGIC_OUT0").unwrap();
//! let snk = fabric.tile_wire("INT_X5Y2", "IMUX0").unwrap();
//!
//! let mut design = RoutedDesign::new();
//! let report = Router::new(&fabric, &session)
//!     .route(&[Connection::new("q").with_lane(src, snk)], &mut design)
//!     .unwrap();
//! assert!(report.is_complete());
//! ```

#![warn(missing_docs)]

pub mod browser;
pub mod custom_route;
pub mod ids;
pub mod junction;
pub mod netlist;
pub mod routing;
pub mod session;
pub mod template;
pub mod tile_path;

pub use browser::{FabricBrowser, TILE_PATHS_FOUND};
pub use custom_route::{CandidatePool, CustomRoute};
pub use ids::NetId;
pub use junction::{EnterWireJunction, ExitWireJunction, WireJunction};
pub use netlist::{PipSelection, RoutedDesign, RoutedNet};
pub use routing::{
    find_template, realize, refine_hop, Connection, Lane, LaneOutcome, LaneReport,
    RealizeOutcome, Router, RoutingReport, BACKTRACK_BUDGET, SKELETON_BUDGET, TEMPLATE_FOUND,
    UNROUTABLE,
};
pub use session::{CacheStats, RoutingSession};
pub use template::RouteTemplate;
pub use tile_path::TilePath;
