mod penalties;
mod risk_dijkstra;
mod state;

pub(crate) use penalties::EdgePenalties;
pub(crate) use risk_dijkstra::{Step, Traversal, risk_dijkstra};
