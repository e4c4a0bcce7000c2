use log::{debug, trace};
use petgraph::graph::NodeIndex;

use super::dijkstra::{EdgePenalties, Step, Traversal, risk_dijkstra};
use super::{Route, RouteOptions};
use crate::{Error, model::RiskGraph};

/// Minimum total `risk_weight` path between two graph nodes
///
/// # Errors
///
/// [`Error::NoPathFound`] if `end` is unreachable from `start` along edge
/// directions, [`Error::InvalidNodeIndex`] for indices outside the graph
pub fn safest_path(graph: &RiskGraph, start: NodeIndex, end: NodeIndex) -> Result<Route, Error> {
    safest_path_with(graph, start, end, &RouteOptions::default())
}

/// [`safest_path`] with explicit options
pub fn safest_path_with(
    graph: &RiskGraph,
    start: NodeIndex,
    end: NodeIndex,
    options: &RouteOptions,
) -> Result<Route, Error> {
    options.validate()?;
    validate_nodes(graph, start, end)?;
    if start == end {
        return Route::stationary(graph, start);
    }

    let (steps, _) = first_search(graph, start, end, options)?;
    Route::from_steps(graph, start, &steps)
}

/// Up to `k` low-risk routes ordered by ascending `total_risk`
///
/// See [`k_safest_routes_with`].
pub fn k_safest_routes(
    graph: &RiskGraph,
    start: NodeIndex,
    end: NodeIndex,
    k: usize,
) -> Result<Vec<Route>, Error> {
    k_safest_routes_with(graph, start, end, k, &RouteOptions::default())
}

/// Up to `k` diverse low-risk routes ordered by ascending `total_risk`.
///
/// The first route is the safest path. After every search the weight
/// multiplier of each edge it used is multiplied by `options.penalty_factor`,
/// so penalties compound: an edge shared by `n` earlier results costs
/// `risk_weight * penalty_factor^n` in the next search. A search that only
/// repeats an earlier route is discarded but still penalized, which pushes
/// the following search further away. Searching stops once `k` distinct
/// routes are found or after `options.max_extra_attempts` repeated results.
///
/// This is a greedy heuristic: it does not guarantee the `k` globally
/// cheapest simple paths, and on networks with few alternatives it returns
/// fewer than `k` routes rather than repeating one. Penalties live in a
/// per-query overlay; the graph is never modified, and `total_risk` is
/// always reported with canonical weights.
///
/// # Errors
///
/// Same as [`safest_path`]; `k == 0` yields an empty list.
pub fn k_safest_routes_with(
    graph: &RiskGraph,
    start: NodeIndex,
    end: NodeIndex,
    k: usize,
    options: &RouteOptions,
) -> Result<Vec<Route>, Error> {
    options.validate()?;
    validate_nodes(graph, start, end)?;
    if k == 0 {
        return Ok(Vec::new());
    }
    if start == end {
        return Ok(vec![Route::stationary(graph, start)?]);
    }

    let (steps, traversal) = first_search(graph, start, end, options)?;
    let mut routes = vec![Route::from_steps(graph, start, &steps)?];

    let mut penalties = EdgePenalties::default();
    penalties.penalize(routes[0].edges(), options.penalty_factor);

    let mut searches: usize = 1;
    let mut repeats: usize = 0;
    while routes.len() < k && repeats < options.max_extra_attempts {
        searches = searches.saturating_add(1);
        let Some(steps) = risk_dijkstra(graph, start, end, traversal, &penalties) else {
            break;
        };
        let candidate = Route::from_steps(graph, start, &steps)?;
        penalties.penalize(candidate.edges(), options.penalty_factor);

        if routes.iter().any(|route| route.nodes() == candidate.nodes()) {
            repeats += 1;
            trace!("Search {searches} repeated an earlier route, penalizing further");
            continue;
        }
        routes.push(candidate);
    }

    // Stable, so the unpenalized optimum stays first among equals
    routes.sort_by(|a, b| a.total_risk().total_cmp(&b.total_risk()));
    debug!(
        "Found {} of {k} requested routes in {searches} searches ({} edges penalized)",
        routes.len(),
        penalties.len()
    );
    Ok(routes)
}

fn validate_nodes(graph: &RiskGraph, start: NodeIndex, end: NodeIndex) -> Result<(), Error> {
    if graph.node(start).is_none() || graph.node(end).is_none() {
        return Err(Error::InvalidNodeIndex);
    }
    Ok(())
}

/// Unpenalized search, falling back to relaxed one-way handling when allowed
fn first_search(
    graph: &RiskGraph,
    start: NodeIndex,
    end: NodeIndex,
    options: &RouteOptions,
) -> Result<(Vec<Step>, Traversal), Error> {
    let none = EdgePenalties::default();
    if let Some(steps) = risk_dijkstra(graph, start, end, Traversal::Directed, &none) {
        return Ok((steps, Traversal::Directed));
    }

    if options.relax_oneway {
        debug!("No directed path from {start:?} to {end:?}, ignoring one-way restrictions");
        if let Some(steps) = risk_dijkstra(graph, start, end, Traversal::Relaxed, &none) {
            return Ok((steps, Traversal::Relaxed));
        }
    }

    Err(Error::NoPathFound)
}
