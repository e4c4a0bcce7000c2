use geo::Point;
use petgraph::graph::NodeIndex;

use crate::{Error, model::RiskGraph};

/// Graph node closest to `point` by great-circle distance.
///
/// Looks the point up in the graph's R-tree of node positions; ties go to
/// the lowest snapshot id.
///
/// # Errors
///
/// [`Error::SnapFailed`] if the graph has no nodes, [`Error::InvalidData`]
/// for non-finite coordinates
pub fn snap(graph: &RiskGraph, point: &Point<f64>) -> Result<NodeIndex, Error> {
    if !point.x().is_finite() || !point.y().is_finite() {
        return Err(Error::InvalidData(format!(
            "Cannot snap non-finite coordinate ({}, {})",
            point.y(),
            point.x()
        )));
    }

    let (node, distance) = graph.nearest_node(point).ok_or(Error::SnapFailed)?;
    log::trace!(
        "Snapped ({}, {}) to node {:?} at {distance:.1} m",
        point.y(),
        point.x(),
        node
    );
    Ok(node)
}
