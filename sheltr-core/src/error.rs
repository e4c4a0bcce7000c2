use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid edge geometry: {0}")]
    InvalidGeometry(String),
    #[error("Street network has no usable nodes or edges")]
    EmptyNetwork,
    #[error("No viable evacuation path between the selected points")]
    NoPathFound,
    #[error("No graph nodes found for snapping")]
    SnapFailed,
    #[error("Invalid node index")]
    InvalidNodeIndex,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
