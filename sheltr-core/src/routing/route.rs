use geo::{Coord, LineString};
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::dijkstra::Step;
use crate::{Error, model::RiskGraph};

/// A computed evacuation route
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    nodes: Vec<NodeIndex>,
    edges: Vec<EdgeIndex>,
    path: Vec<Coord<f64>>,
    total_risk: f64,
    total_length: f64,
}

impl Route {
    /// Zero-length route that never leaves `node`
    pub(crate) fn stationary(graph: &RiskGraph, node: NodeIndex) -> Result<Self, Error> {
        let location = graph.node(node).ok_or(Error::InvalidNodeIndex)?;
        Ok(Self {
            nodes: vec![node],
            edges: Vec::new(),
            path: vec![location.geometry.0],
            total_risk: 0.0,
            total_length: 0.0,
        })
    }

    /// Assembles a route from the edges found by the search. Risk and length
    /// are summed from the canonical edge values, whatever penalties steered
    /// the search.
    pub(crate) fn from_steps(
        graph: &RiskGraph,
        start: NodeIndex,
        steps: &[Step],
    ) -> Result<Self, Error> {
        if steps.is_empty() {
            return Self::stationary(graph, start);
        }

        let mut nodes = Vec::with_capacity(steps.len() + 1);
        let mut edges = Vec::with_capacity(steps.len());
        let mut path: Vec<Coord<f64>> = Vec::with_capacity(steps.len() * 2);
        let mut total_risk = 0.0;
        let mut total_length = 0.0;

        nodes.push(start);
        for (idx, step) in steps.iter().enumerate() {
            let edge = graph.edge(step.edge).ok_or(Error::InvalidNodeIndex)?;
            total_risk += edge.risk_weight;
            total_length += edge.length_m;
            nodes.push(step.to);
            edges.push(step.edge);

            let segment = oriented_coords(&edge.geometry, step.reversed);
            // Consecutive segments share their joining vertex
            let skip = usize::from(idx > 0 && !path.is_empty());
            path.extend(segment.into_iter().skip(skip));
        }

        Ok(Self {
            nodes,
            edges,
            path,
            total_risk,
            total_length,
        })
    }

    /// Graph nodes visited, start and end included
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// Traversed edges in order
    pub fn edges(&self) -> &[EdgeIndex] {
        &self.edges
    }

    /// Route polyline (x = lon, y = lat)
    pub fn path(&self) -> &[Coord<f64>] {
        &self.path
    }

    /// Polyline as `[lat, lon]` pairs, the order map clients expect
    pub fn lat_lon_path(&self) -> Vec<[f64; 2]> {
        self.path.iter().map(|c| [c.y, c.x]).collect()
    }

    /// Sum of the traversed edges' `risk_weight`
    pub fn total_risk(&self) -> f64 {
        self.total_risk
    }

    /// Sum of the traversed edges' length in metres
    pub fn total_length(&self) -> f64 {
        self.total_length
    }
}

fn oriented_coords(geometry: &LineString<f64>, reversed: bool) -> Vec<Coord<f64>> {
    if reversed {
        geometry.0.iter().rev().copied().collect()
    } else {
        geometry.0.clone()
    }
}
