mod common;

use common::{EastIsDangerous, diamond, edge, grid, node};
use geo::Point;
use sheltr_core::prelude::*;
use sheltr_core::scoring::SeededScorer;
use sheltr_core::{build_risk_graph, k_safest_routes, safest_path};

fn config(risk_factor_weight: f64) -> NetworkConfig {
    NetworkConfig {
        risk_factor_weight,
        ..NetworkConfig::default()
    }
}

fn ids(graph: &RiskGraph, route: &Route) -> Vec<NodeId> {
    route
        .nodes()
        .iter()
        .map(|&n| graph.node(n).unwrap().id)
        .collect()
}

#[test]
fn safest_path_avoids_the_hazard_despite_being_longer() {
    let graph = build_risk_graph(&diamond(), &EastIsDangerous, &config(2.0)).unwrap();
    let a = graph.node_index(1).unwrap();
    let d = graph.node_index(4).unwrap();

    let route = safest_path(&graph, a, d).unwrap();
    assert_eq!(ids(&graph, &route), vec![1, 2, 4]);
    assert!((route.total_risk() - 10.0).abs() < 1e-9);
    assert!((route.total_length() - 10.0).abs() < 1e-9);
}

#[test]
fn zero_risk_factor_is_shortest_distance() {
    let graph = build_risk_graph(&diamond(), &EastIsDangerous, &config(0.0)).unwrap();
    let a = graph.node_index(1).unwrap();
    let d = graph.node_index(4).unwrap();

    let route = safest_path(&graph, a, d).unwrap();
    assert_eq!(ids(&graph, &route), vec![1, 3, 4]);
    assert!((route.total_risk() - route.total_length()).abs() < 1e-9);
    assert!((route.total_length() - 8.0).abs() < 1e-9);
}

#[test]
fn same_start_and_end() {
    let graph = build_risk_graph(&diamond(), &EastIsDangerous, &config(2.0)).unwrap();
    let b = graph.node_index(2).unwrap();

    let route = safest_path(&graph, b, b).unwrap();
    assert_eq!(route.nodes(), &[b]);
    assert_eq!(route.path().len(), 1);
    assert_eq!(route.total_risk(), 0.0);
    assert_eq!(route.total_length(), 0.0);

    let routes = k_safest_routes(&graph, b, b, 3).unwrap();
    assert_eq!(routes.len(), 1);
}

#[test]
fn unreachable_destination() {
    let graph = build_risk_graph(&diamond(), &EastIsDangerous, &config(2.0)).unwrap();
    let a = graph.node_index(1).unwrap();
    let d = graph.node_index(4).unwrap();

    assert!(matches!(safest_path(&graph, d, a), Err(Error::NoPathFound)));
    assert!(matches!(
        k_safest_routes(&graph, d, a, 3),
        Err(Error::NoPathFound)
    ));

    let relaxed = RouteOptions {
        relax_oneway: true,
        ..RouteOptions::default()
    };
    let route = safest_path_with(&graph, d, a, &relaxed).unwrap();
    assert_eq!(ids(&graph, &route), vec![4, 2, 1]);
    // geometry runs from D back to A
    assert_eq!(route.path().first().unwrap().y, 0.002);
    assert_eq!(route.path().last().unwrap().y, 0.0);
}

#[test]
fn k_one_matches_safest_path() {
    let scorer: RiskScorer = SeededScorer::new(7, 1.0).unwrap().into();
    let graph = build_risk_graph(&grid(4), &scorer, &config(2.0)).unwrap();
    let start = graph.node_index(1).unwrap();
    let end = graph.node_index(16).unwrap();

    let best = safest_path(&graph, start, end).unwrap();
    let routes = k_safest_routes(&graph, start, end, 1).unwrap();
    assert_eq!(routes, vec![best]);
}

#[test]
fn k_routes_are_ordered_distinct_and_bounded() {
    let scorer: RiskScorer = SeededScorer::new(42, 1.0).unwrap().into();
    let graph = build_risk_graph(&grid(5), &scorer, &config(2.0)).unwrap();
    let start = graph.node_index(1).unwrap();
    let end = graph.node_index(25).unwrap();

    let best = safest_path(&graph, start, end).unwrap();
    let routes = k_safest_routes(&graph, start, end, 4).unwrap();

    assert!(!routes.is_empty() && routes.len() <= 4);
    assert_eq!(routes[0], best);
    for pair in routes.windows(2) {
        assert!(pair[0].total_risk() <= pair[1].total_risk());
    }
    for (i, a) in routes.iter().enumerate() {
        for b in &routes[i + 1..] {
            assert_ne!(a.nodes(), b.nodes());
        }
    }
    assert!(routes.len() > 1, "a 5x5 grid has plenty of alternatives");
}

#[test]
fn fewer_routes_than_requested_when_only_one_exists() {
    let network = RawNetwork {
        nodes: vec![node(1, 0.0, 0.0), node(2, 0.0, 0.001), node(3, 0.0, 0.002)],
        edges: vec![edge(1, 2, 111.0), edge(2, 3, 111.0)],
    };
    let graph = build_risk_graph(&network, &EastIsDangerous, &config(1.0)).unwrap();
    let start = graph.node_index(1).unwrap();
    let end = graph.node_index(3).unwrap();

    let routes = k_safest_routes(&graph, start, end, 5).unwrap();
    assert_eq!(routes.len(), 1);
    assert!(k_safest_routes(&graph, start, end, 0).unwrap().is_empty());
}

#[test]
fn huge_k_returns_every_alternative_found() {
    let graph = build_risk_graph(&diamond(), &EastIsDangerous, &config(2.0)).unwrap();
    let a = graph.node_index(1).unwrap();
    let d = graph.node_index(4).unwrap();

    let routes = k_safest_routes(&graph, a, d, usize::MAX).unwrap();
    assert_eq!(routes.len(), 2);

    let patient = RouteOptions {
        max_extra_attempts: usize::MAX,
        ..RouteOptions::default()
    };
    let routes = k_safest_routes_with(&graph, a, d, 2, &patient).unwrap();
    assert_eq!(routes.len(), 2);
    assert!(routes[0].total_risk() <= routes[1].total_risk());
}

#[test]
fn diversification_leaves_the_graph_untouched() {
    let scorer: RiskScorer = SeededScorer::new(3, 1.0).unwrap().into();
    let graph = build_risk_graph(&grid(4), &scorer, &config(2.0)).unwrap();
    let before: Vec<f64> = graph.edges().map(|e| e.edge.risk_weight).collect();

    let start = graph.node_index(1).unwrap();
    let end = graph.node_index(16).unwrap();
    k_safest_routes(&graph, start, end, 5).unwrap();

    let after: Vec<f64> = graph.edges().map(|e| e.edge.risk_weight).collect();
    assert_eq!(before, after);
    assert_eq!(
        safest_path(&graph, start, end).unwrap(),
        k_safest_routes(&graph, start, end, 1).unwrap().remove(0)
    );
}

#[test]
fn diamond_alternatives() {
    let graph = build_risk_graph(&diamond(), &EastIsDangerous, &config(2.0)).unwrap();
    let a = graph.node_index(1).unwrap();
    let d = graph.node_index(4).unwrap();

    let routes = k_safest_routes(&graph, a, d, 3).unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(ids(&graph, &routes[0]), vec![1, 2, 4]);
    assert_eq!(ids(&graph, &routes[1]), vec![1, 3, 4]);
    assert!((routes[1].total_risk() - 24.0).abs() < 1e-9);
}

#[test]
fn snap_picks_the_closest_node() {
    let network = RawNetwork {
        nodes: vec![node(1, 0.0, 0.0), node(2, 10.0, 10.0)],
        edges: vec![edge(1, 2, 1_500_000.0)],
    };
    let graph = build_risk_graph(&network, &EastIsDangerous, &config(1.0)).unwrap();

    let snapped = snap(&graph, &Point::new(1.0, 1.0)).unwrap();
    assert_eq!(graph.node(snapped).unwrap().id, 1);

    let snapped = snap(&graph, &Point::new(9.0, 9.5)).unwrap();
    assert_eq!(graph.node(snapped).unwrap().id, 2);

    assert!(matches!(
        snap(&graph, &Point::new(f64::NAN, 0.0)),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn invalid_node_index_is_reported() {
    let graph = build_risk_graph(&diamond(), &EastIsDangerous, &config(2.0)).unwrap();
    let a = graph.node_index(1).unwrap();
    let bogus = petgraph::graph::NodeIndex::new(99);
    assert!(matches!(
        safest_path(&graph, a, bogus),
        Err(Error::InvalidNodeIndex)
    ));
}

#[test]
fn concurrent_queries_share_one_graph() {
    let scorer: RiskScorer = SeededScorer::new(11, 1.0).unwrap().into();
    let graph = build_risk_graph(&grid(6), &scorer, &config(2.0)).unwrap();
    let start = graph.node_index(1).unwrap();
    let end = graph.node_index(36).unwrap();
    let expected = k_safest_routes(&graph, start, end, 3).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| k_safest_routes(&graph, start, end, 3).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
