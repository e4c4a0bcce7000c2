//! Risk-weighted street graph

use geo::Point;
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::components::{RiskEdge, RiskNode};
use crate::NodeId;
use crate::geometry::{point_distance, unit_sphere_position};

/// Node position on the unit sphere tagged with its graph index
pub(crate) type IndexedNode = GeomWithData<[f64; 3], NodeIndex>;

/// Street network with per-edge hazard scores and traversal weights.
///
/// Built once from a snapshot and read-only afterwards; every query takes
/// `&RiskGraph`, so one instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct RiskGraph {
    pub(crate) graph: DiGraph<RiskNode, RiskEdge>,
    pub(crate) id_index: HashMap<NodeId, NodeIndex>,
    pub(crate) risk_factor_weight: f64,
    pub(crate) spatial: RTree<IndexedNode>,
}

/// Borrowed view of one stored edge with its endpoints
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    pub index: EdgeIndex,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub edge: &'a RiskEdge,
}

impl RiskGraph {
    pub(crate) fn with_capacity(nodes: usize, edges: usize, risk_factor_weight: f64) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            id_index: HashMap::with_capacity(nodes),
            risk_factor_weight,
            spatial: RTree::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Amplification constant the edge weights were derived with
    pub fn risk_factor_weight(&self) -> f64 {
        self.risk_factor_weight
    }

    pub fn node(&self, index: NodeIndex) -> Option<&RiskNode> {
        self.graph.node_weight(index)
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&RiskEdge> {
        self.graph.edge_weight(index)
    }

    /// Graph index of the node with the given snapshot id
    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &RiskNode)> {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    /// All edges in storage order
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.graph.edge_references().map(|edge| EdgeView {
            index: edge.id(),
            source: edge.source(),
            target: edge.target(),
            edge: edge.weight(),
        })
    }

    /// Nearest node by great-circle distance, with the distance in metres.
    ///
    /// Equal distances resolve to the lowest snapshot id.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        let query = unit_sphere_position(point);
        let mut candidates = self.spatial.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best) = candidates.next()?;

        // Tied nodes come out of the iterator next to each other
        let tolerance = best * 1e-12;
        let mut chosen = first.data;
        for (entry, distance_2) in candidates {
            if distance_2 > best + tolerance {
                break;
            }
            if self.graph[entry.data].id < self.graph[chosen].id {
                chosen = entry.data;
            }
        }

        Some((chosen, point_distance(point, &self.graph[chosen].geometry)))
    }

    pub(crate) fn add_node(&mut self, node: RiskNode) -> NodeIndex {
        let id = node.id;
        let index = self.graph.add_node(node);
        self.id_index.insert(id, index);
        index
    }

    /// Rebuilds the snapping index from the current node set
    pub(crate) fn index_nodes(&mut self) {
        let entries = self
            .nodes()
            .map(|(index, node)| IndexedNode::new(unit_sphere_position(&node.geometry), index))
            .collect();
        self.spatial = RTree::bulk_load(entries);
    }

    pub(crate) fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, edge: RiskEdge) -> EdgeIndex {
        self.graph.add_edge(source, target, edge)
    }
}
