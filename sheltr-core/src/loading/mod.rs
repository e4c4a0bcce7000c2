//! This module is responsible for reading street network snapshots and
//! building the risk-weighted routing graph from them.

mod builder;
mod config;
pub mod snapshot;

pub use builder::{build_risk_graph, create_risk_graph};
pub use config::{NetworkConfig, StructurePolicy};
pub use snapshot::{RawEdge, RawNetwork, RawNode};
