//! Risk graph components - nodes and street segments

use geo::{LineString, Point};

use crate::NodeId;

/// Risk graph node
#[derive(Debug, Clone)]
pub struct RiskNode {
    /// Identifier from the source snapshot (OSM id for OSM extracts)
    pub id: NodeId,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Risk graph edge (street segment)
#[derive(Debug, Clone)]
pub struct RiskEdge {
    /// Physical length in metres
    pub length_m: f64,
    /// Hazard exposure in [0, 1]
    pub risk_score: f64,
    /// Traversal cost used by the path search, never below `length_m`
    pub risk_weight: f64,
    /// Whether the segment may also be traversed target -> source
    pub bidirectional: bool,
    /// Segment geometry oriented from source to target
    pub geometry: LineString<f64>,
}

/// Traversal cost of a segment: `length_m * (1 + risk_factor_weight * risk_score)`
pub fn risk_weight(length_m: f64, risk_score: f64, risk_factor_weight: f64) -> f64 {
    length_m * (1.0 + risk_factor_weight * risk_score)
}
