//! Risk-aware evacuation routing over street networks.
//!
//! A raw street snapshot is turned into a [`RiskGraph`] whose edges carry a
//! hazard score and a traversal weight blending length with that hazard.
//! The graph answers routing queries ([`safest_path`], [`k_safest_routes`])
//! and exports its hazard surface ([`export_risk_layer`]).

pub mod export;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod scoring;

mod error;

pub use error::Error;
pub use export::{RiskFeature, export_risk_layer, risk_layer_geojson, risk_layer_geojson_string};
pub use loading::{NetworkConfig, RawNetwork, StructurePolicy, build_risk_graph, create_risk_graph};
pub use model::RiskGraph;
pub use routing::{
    Route, RouteOptions, k_safest_routes, k_safest_routes_with, safest_path, safest_path_with,
    snap,
};

/// Node identifier carried over from the snapshot
pub type NodeId = i64;

/// Margin in degrees added around the two query points when the area of
/// interest is derived from them
pub const BBOX_MARGIN_DEGREES: f64 = 0.02;
