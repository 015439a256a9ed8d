//! End-to-end routing of connections on the synthetic switchbox fabric.

use sinew_config::load_config_from_str;
use sinew_diagnostics::{DiagnosticRenderer, Severity, TerminalRenderer};
use sinew_fabric::{switchbox_grid, Fabric, GridFabric, NodeId};
use sinew_route::{
    Connection, LaneOutcome, RoutedDesign, Router, RoutingSession, TEMPLATE_FOUND, UNROUTABLE,
};
use std::collections::HashSet;

fn pin_lane(fabric: &GridFabric, src: (i32, i32, usize), snk: (i32, i32, usize)) -> Connection {
    let src_tw = fabric
        .tile_wire(&format!("INT_X{}Y{}", src.0, src.1), &format!("LOGIC_OUT{}", src.2))
        .unwrap();
    let snk_tw = fabric
        .tile_wire(&format!("INT_X{}Y{}", snk.0, snk.1), &format!("IMUX{}", snk.2))
        .unwrap();
    Connection::new(format!("c{}_{}_{}", src.0, src.1, src.2)).with_lane(src_tw, snk_tw)
}

/// Every node a net's PIPs touch.
fn net_nodes(fabric: &dyn Fabric, design: &RoutedDesign, name: &str) -> HashSet<NodeId> {
    let net = design.net_by_name(name).unwrap();
    net.pips
        .iter()
        .flat_map(|pip| [fabric.node_of(pip.tile, pip.src), fabric.node_of(pip.tile, pip.dst)])
        .collect()
}

#[test]
fn parallel_connections_never_share_nodes() {
    let fabric = switchbox_grid(10, 10);
    let config = load_config_from_str("[router]\njobs = 3\n").unwrap();
    let session = RoutingSession::new(config);

    let connections = vec![
        pin_lane(&fabric, (0, 0, 0), (7, 3, 0)),
        pin_lane(&fabric, (1, 0, 1), (8, 4, 1)),
        pin_lane(&fabric, (2, 9, 2), (2, 1, 2)),
        pin_lane(&fabric, (9, 9, 3), (0, 8, 3)),
        pin_lane(&fabric, (5, 5, 0), (5, 6, 1)),
        pin_lane(&fabric, (4, 2, 1), (9, 2, 3)),
    ];
    let mut design = RoutedDesign::new();
    let report = Router::new(&fabric, &session)
        .route(&connections, &mut design)
        .unwrap();
    assert!(report.is_complete(), "{:?}", report.lanes);
    assert!(design.is_fully_routed());

    let mut seen: HashSet<NodeId> = HashSet::new();
    for c in &connections {
        let nodes = net_nodes(&fabric, &design, &c.net_name(0));
        assert!(seen.is_disjoint(&nodes), "{} overlaps another net", c.name);
        seen.extend(nodes);
    }
    assert_eq!(session.locked_count(), seen.len());
    assert!(session.sink().count_code(TEMPLATE_FOUND) >= connections.len());
}

#[test]
fn routed_pips_form_a_chain_from_source_to_sink() {
    let fabric = switchbox_grid(8, 8);
    let session = RoutingSession::default();
    let connection = pin_lane(&fabric, (1, 1, 2), (6, 5, 1));
    let lane = connection.lanes[0];
    let mut design = RoutedDesign::new();
    Router::new(&fabric, &session)
        .route(std::slice::from_ref(&connection), &mut design)
        .unwrap();

    let pips = &design.net_by_name("c1_1_2[0]").unwrap().pips;
    let first = pips.first().unwrap();
    let last = pips.last().unwrap();
    assert_eq!((first.tile, first.src), (lane.src.tile, lane.src.wire));
    assert_eq!((last.tile, last.dst), (lane.snk.tile, lane.snk.wire));
    for pair in pips.windows(2) {
        // Each PIP drives the node the next one starts from.
        assert_eq!(
            fabric.node_of(pair[0].tile, pair[0].dst),
            fabric.node_of(pair[1].tile, pair[1].src)
        );
    }
}

#[test]
fn footprint_is_avoided() {
    let fabric = switchbox_grid(6, 6);
    let connection = pin_lane(&fabric, (0, 2, 0), (5, 2, 0));

    // Route once to learn which nodes the unconstrained route uses.
    let session = RoutingSession::default();
    let mut design = RoutedDesign::new();
    Router::new(&fabric, &session)
        .route(std::slice::from_ref(&connection), &mut design)
        .unwrap();
    let first = net_nodes(&fabric, &design, "c0_2_0[0]");
    let src_node = fabric.node_of(connection.lanes[0].src.tile, connection.lanes[0].src.wire);
    let snk_node = fabric.node_of(connection.lanes[0].snk.tile, connection.lanes[0].snk.wire);
    let blocked: HashSet<NodeId> = first
        .iter()
        .copied()
        .filter(|&n| n != src_node && n != snk_node && fabric.is_buffer_node(n))
        .collect();
    assert!(!blocked.is_empty());

    let session = RoutingSession::default();
    session.set_footprint(&fabric, blocked.iter().copied());
    let mut design = RoutedDesign::new();
    let report = Router::new(&fabric, &session)
        .route(std::slice::from_ref(&connection), &mut design)
        .unwrap();
    assert!(report.is_complete());
    let second = net_nodes(&fabric, &design, "c0_2_0[0]");
    assert!(second.is_disjoint(&blocked));
}

#[test]
fn blocked_sink_is_reported_and_rendered() {
    let fabric = switchbox_grid(4, 4);
    let connection = pin_lane(&fabric, (0, 0, 0), (3, 3, 0));
    let snk = connection.lanes[0].snk;
    let session = RoutingSession::default();
    session.set_footprint(&fabric, [fabric.node_of(snk.tile, snk.wire)]);

    let mut design = RoutedDesign::new();
    let report = Router::new(&fabric, &session)
        .route(std::slice::from_ref(&connection), &mut design)
        .unwrap();
    assert_eq!(report.failed_count(), 1);
    assert!(matches!(report.lanes[0].outcome, LaneOutcome::Unroutable { .. }));
    assert!(!design.is_fully_routed());
    assert_eq!(session.sink().count_code(UNROUTABLE), 1);

    let renderer = TerminalRenderer::new(false, Severity::Warning);
    let diagnostics = session.sink().take_all();
    let unroutable = diagnostics.iter().find(|d| d.code == UNROUTABLE).unwrap();
    let rendered = renderer.render(unroutable);
    assert!(rendered.starts_with("error[E201]: lane c0_0_0[0] is unroutable\n   = note: "));
}

#[test]
fn wide_bus_routes_every_lane() {
    let fabric = switchbox_grid(12, 10);
    let session = RoutingSession::default();
    let mut bus = Connection::new("data");
    for bit in 0..4 {
        let src = fabric.tile_wire(&format!("INT_X1Y{}", bit * 2), "LOGIC_OUT1").unwrap();
        let snk = fabric.tile_wire(&format!("INT_X9Y{}", bit * 2 + 1), "IMUX2").unwrap();
        bus = bus.with_lane(src, snk);
    }
    let mut design = RoutedDesign::new();
    let report = Router::new(&fabric, &session).route(&[bus], &mut design).unwrap();
    assert_eq!(report.routed_count(), 4);
    for bit in 0..4 {
        assert!(design.net_by_name(&format!("data[{bit}]")).unwrap().is_routed());
    }
    let stats = session.cache_stats();
    assert!(stats.hits > 0);
}
