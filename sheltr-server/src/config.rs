use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use sheltr_core::geometry::BoundingBox;
use sheltr_core::{NetworkConfig, RouteOptions};

/// Risk-aware evacuation routing server
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, env = "SHELTR_CONFIG")]
    pub config: Option<PathBuf>,
    /// Street network snapshot (JSON)
    #[arg(long, env = "SHELTR_SNAPSHOT")]
    pub snapshot: PathBuf,
    #[arg(long, env = "SHELTR_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,
    /// Area of interest; all four bounds must be given together
    #[arg(long, env = "SHELTR_NORTH", allow_negative_numbers = true)]
    pub north: Option<f64>,
    #[arg(long, env = "SHELTR_SOUTH", allow_negative_numbers = true)]
    pub south: Option<f64>,
    #[arg(long, env = "SHELTR_EAST", allow_negative_numbers = true)]
    pub east: Option<f64>,
    #[arg(long, env = "SHELTR_WEST", allow_negative_numbers = true)]
    pub west: Option<f64>,
}

impl Args {
    /// Configured area of interest, `None` when no bound is set
    pub fn area_of_interest(&self) -> Result<Option<BoundingBox>, String> {
        match (self.north, self.south, self.east, self.west) {
            (None, None, None, None) => Ok(None),
            (Some(north), Some(south), Some(east), Some(west)) => {
                BoundingBox::new(north, south, east, west)
                    .map(Some)
                    .map_err(|e| e.to_string())
            }
            _ => Err("SHELTR_NORTH, SHELTR_SOUTH, SHELTR_EAST and SHELTR_WEST must be set together".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    pub routing: RouteOptions,
    /// Alternatives returned by `/routes` when `k` is not given
    pub default_k: usize,
    /// Upper bound for a caller-supplied `k`
    pub max_k: usize,
    pub query_timeout_secs: u64,
    pub max_concurrent_queries: usize,
    /// Built graphs kept per area of interest before the cache is reset
    pub max_cached_graphs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            routing: RouteOptions::default(),
            default_k: 3,
            max_k: 10,
            query_timeout_secs: 30,
            max_concurrent_queries: 64,
            max_cached_graphs: 32,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {e}", path.display()))?;
        toml::from_str(&text).map_err(|e| format!("Invalid config '{}': {e}", path.display()))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}
