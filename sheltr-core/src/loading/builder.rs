use geo::{LineString, line_string};
use log::info;
use rayon::prelude::*;

use super::config::{NetworkConfig, StructurePolicy};
use super::snapshot::{RawEdge, RawNetwork};
use crate::geometry::line_length;
use crate::model::{RiskEdge, RiskGraph, RiskNode, risk_weight};
use crate::scoring::ScoreEdge;
use crate::{Error, NodeId};

/// Builds a risk graph with the scorer described by `config.scorer`
///
/// # Errors
///
/// Returns an error if the scorer cannot be built or the snapshot is invalid
pub fn create_risk_graph(network: &RawNetwork, config: &NetworkConfig) -> Result<RiskGraph, Error> {
    let scorer = config.scorer.build()?;
    build_risk_graph(network, &scorer, config)
}

/// Converts a raw snapshot into a risk-weighted routing graph.
///
/// Every edge is scored once and weighted as
/// `length_m * (1 + risk_factor_weight * risk_score)`. Edge direction is kept
/// exactly as in the snapshot and parallel edges stay separate. Edges are
/// stored in snapshot order, so equal inputs always produce equal graphs.
///
/// # Errors
///
/// - [`Error::EmptyNetwork`] if the snapshot has no nodes or no (remaining) edges
/// - [`Error::InvalidGeometry`] if the scorer rejects an edge geometry
/// - [`Error::InvalidData`] for unknown endpoints, duplicate node ids,
///   non-positive lengths or an invalid `risk_factor_weight`
pub fn build_risk_graph<S>(
    network: &RawNetwork,
    scorer: &S,
    config: &NetworkConfig,
) -> Result<RiskGraph, Error>
where
    S: ScoreEdge + Sync,
{
    validate_config(config)?;
    if network.is_empty() {
        return Err(Error::EmptyNetwork);
    }

    let raw_edges: Vec<&RawEdge> = match config.structures {
        StructurePolicy::Exclude => network
            .edges
            .iter()
            .filter(|edge| !edge.is_structure())
            .collect(),
        _ => network.edges.iter().collect(),
    };
    if raw_edges.is_empty() {
        return Err(Error::EmptyNetwork);
    }
    let skipped = network.edges.len() - raw_edges.len();
    if skipped > 0 {
        info!("Skipped {skipped} bridge and tunnel segments");
    }

    let mut graph = RiskGraph::with_capacity(
        network.nodes.len(),
        raw_edges.len(),
        config.risk_factor_weight,
    );
    for node in &network.nodes {
        if !node.lat.is_finite() || !node.lon.is_finite() {
            return Err(Error::InvalidData(format!(
                "Node {} has non-finite coordinates",
                node.id
            )));
        }
        if graph.node_index(node.id).is_some() {
            return Err(Error::InvalidData(format!("Duplicate node id {}", node.id)));
        }
        graph.add_node(RiskNode {
            id: node.id,
            geometry: node.point(),
        });
    }

    graph.index_nodes();

    info!("Scoring {} street segments", raw_edges.len());

    // Collected in snapshot order so that, with several bad edges, the
    // reported error is always the first one
    let prepared: Vec<_> = raw_edges
        .par_iter()
        .map(|raw| prepare_edge(&graph, raw, scorer, config))
        .collect();

    for result in prepared {
        let (source, target, edge) = result?;
        graph.add_edge(source, target, edge);
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_risk =
        graph.edges().map(|e| e.edge.risk_score).sum::<f64>() / graph.edge_count() as f64;
    info!(
        "Risk graph built: {} nodes, {} edges, mean risk score {mean_risk:.3}, risk factor weight {}",
        graph.node_count(),
        graph.edge_count(),
        graph.risk_factor_weight()
    );

    Ok(graph)
}

fn validate_config(config: &NetworkConfig) -> Result<(), Error> {
    if !config.risk_factor_weight.is_finite() || config.risk_factor_weight < 0.0 {
        return Err(Error::InvalidData(format!(
            "risk_factor_weight must be a non-negative number, got {}",
            config.risk_factor_weight
        )));
    }
    if let StructurePolicy::Penalize { floor } = config.structures
        && !(0.0..=1.0).contains(&floor)
    {
        return Err(Error::InvalidData(format!(
            "Structure risk floor must be within [0, 1], got {floor}"
        )));
    }
    Ok(())
}

fn prepare_edge<S: ScoreEdge>(
    graph: &RiskGraph,
    raw: &RawEdge,
    scorer: &S,
    config: &NetworkConfig,
) -> Result<(petgraph::graph::NodeIndex, petgraph::graph::NodeIndex, RiskEdge), Error> {
    let source = resolve(graph, raw.source)?;
    let target = resolve(graph, raw.target)?;

    let geometry = match raw.line_string() {
        Some(line) => line,
        None => straight_line(graph, source, target)?,
    };
    let length_m = raw.length_m.unwrap_or_else(|| line_length(&geometry));

    let mut risk_score = scorer.score(&geometry, length_m)?;
    if !(0.0..=1.0).contains(&risk_score) {
        return Err(Error::InvalidData(format!(
            "Scorer returned {risk_score} for edge {} -> {}",
            raw.source, raw.target
        )));
    }
    if !length_m.is_finite() || length_m <= 0.0 {
        return Err(Error::InvalidData(format!(
            "Edge {} -> {} has non-positive length {length_m}",
            raw.source, raw.target
        )));
    }

    if let StructurePolicy::Penalize { floor } = config.structures
        && raw.is_structure()
    {
        risk_score = risk_score.max(floor);
    }

    let edge = RiskEdge {
        length_m,
        risk_score,
        risk_weight: risk_weight(length_m, risk_score, config.risk_factor_weight),
        bidirectional: raw.bidirectional,
        geometry,
    };
    Ok((source, target, edge))
}

fn resolve(graph: &RiskGraph, id: NodeId) -> Result<petgraph::graph::NodeIndex, Error> {
    graph
        .node_index(id)
        .ok_or_else(|| Error::InvalidData(format!("Edge references unknown node {id}")))
}

fn straight_line(
    graph: &RiskGraph,
    source: petgraph::graph::NodeIndex,
    target: petgraph::graph::NodeIndex,
) -> Result<LineString<f64>, Error> {
    let (Some(from), Some(to)) = (graph.node(source), graph.node(target)) else {
        return Err(Error::InvalidNodeIndex);
    };
    Ok(line_string![
        (x: from.geometry.x(), y: from.geometry.y()),
        (x: to.geometry.x(), y: to.geometry.y()),
    ])
}
