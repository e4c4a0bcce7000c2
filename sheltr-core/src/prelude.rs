pub use crate::BBOX_MARGIN_DEGREES;

// Re-export key components
pub use crate::export::{RiskFeature, export_risk_layer, risk_layer_geojson};
pub use crate::geometry::{BoundingBox, haversine_distance};
pub use crate::loading::{NetworkConfig, RawNetwork, StructurePolicy, create_risk_graph};
pub use crate::model::RiskGraph;
pub use crate::routing::{Route, RouteOptions, k_safest_routes_with, safest_path_with, snap};
pub use crate::scoring::{RiskScorer, ScoreEdge, ScorerConfig};

// Core types
pub use crate::Error;
pub use crate::NodeId;
