use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::{
    Direction,
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::{EdgePenalties, state::State};
use crate::model::RiskGraph;

/// Which stored edges may be traversed against their stored direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Traversal {
    /// Only edges flagged bidirectional
    Directed,
    /// Every edge, ignoring one-way restrictions
    Relaxed,
}

/// One traversed edge of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub(crate) from: NodeIndex,
    pub(crate) to: NodeIndex,
    pub(crate) edge: EdgeIndex,
    /// Edge walked target -> source
    pub(crate) reversed: bool,
}

/// Dijkstra's algorithm over `risk_weight` scaled by the penalty overlay.
///
/// Returns the edge sequence of the cheapest path from `start` to `target`
/// (empty when they coincide) or `None` if `target` is unreachable.
pub(crate) fn risk_dijkstra(
    graph: &RiskGraph,
    start: NodeIndex,
    target: NodeIndex,
    traversal: Traversal,
    penalties: &EdgePenalties,
) -> Option<Vec<Step>> {
    let estimated_nodes = graph.graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, Step> = HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(graph.graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if settled.contains(node.index()) {
            continue;
        }
        settled.insert(node.index());

        if node == target {
            break;
        }

        let outgoing = graph
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge, false));
        let incoming = graph
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|edge| traversal == Traversal::Relaxed || edge.weight().bidirectional)
            .map(|edge| (edge, true));

        for (edge, reversed) in outgoing.chain(incoming) {
            let next = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            if settled.contains(next.index()) {
                continue;
            }

            let weight = edge.weight().risk_weight * penalties.multiplier(edge.id());
            let next_cost = cost + weight;

            let improved = distances.get(&next).is_none_or(|&best| next_cost < best);
            if improved {
                distances.insert(next, next_cost);
                predecessors.insert(
                    next,
                    Step {
                        from: node,
                        to: next,
                        edge: edge.id(),
                        reversed,
                    },
                );
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    if !settled.contains(target.index()) {
        return None;
    }

    // Follow predecessors backward from target to start
    let mut steps = Vec::new();
    let mut current = target;
    while current != start {
        let step = predecessors.get(&current)?;
        steps.push(*step);
        current = step.from;
    }
    steps.reverse();
    Some(steps)
}
