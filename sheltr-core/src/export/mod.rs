//! Risk overlay export for heatmap rendering

mod to_geojson;

use geo::LineString;
use petgraph::graph::EdgeIndex;

use crate::{NodeId, model::RiskGraph};

pub use to_geojson::{risk_layer_geojson, risk_layer_geojson_string};

/// One edge's geometry paired with its hazard score
#[derive(Debug, Clone, Copy)]
pub struct RiskFeature<'a> {
    pub edge: EdgeIndex,
    pub source: NodeId,
    pub target: NodeId,
    pub geometry: &'a LineString<f64>,
    pub risk_score: f64,
    pub risk_weight: f64,
    pub length_m: f64,
}

/// One feature per stored edge, in storage order. Parallel edges are not
/// merged.
pub fn export_risk_layer(graph: &RiskGraph) -> Vec<RiskFeature<'_>> {
    graph
        .edges()
        .map(|view| RiskFeature {
            edge: view.index,
            source: graph.graph[view.source].id,
            target: graph.graph[view.target].id,
            geometry: &view.edge.geometry,
            risk_score: view.edge.risk_score,
            risk_weight: view.edge.risk_weight,
            length_m: view.edge.length_m,
        })
        .collect()
}
