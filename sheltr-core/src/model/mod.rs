//! Data model of the risk-weighted routing graph
//!
//! Contains the node and edge payloads and the graph that owns them.

pub mod components;
pub mod network;

pub use components::{RiskEdge, RiskNode, risk_weight};
pub use network::{EdgeView, RiskGraph};
