//! Route engine: snapping coordinates to the graph, the safest path and
//! diversified alternatives.

pub(crate) mod dijkstra;
mod options;
mod route;
mod safest;
mod snap;

pub use options::RouteOptions;
pub use petgraph::graph::{EdgeIndex, NodeIndex};
pub use route::Route;
pub use safest::{k_safest_routes, k_safest_routes_with, safest_path, safest_path_with};
pub use snap::snap;
