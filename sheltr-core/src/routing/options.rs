use serde::{Deserialize, Serialize};

use crate::Error;

/// Tuning of route queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Retry ignoring one-way restrictions when the directed search finds
    /// no path
    pub relax_oneway: bool,
    /// Multiplier applied to the weight of every edge used by an earlier
    /// alternative, compounding when an edge is reused
    pub penalty_factor: f64,
    /// Searches that may repeat an earlier route before giving up on
    /// finding more distinct alternatives
    pub max_extra_attempts: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            relax_oneway: false,
            penalty_factor: 2.0,
            max_extra_attempts: 4,
        }
    }
}

impl RouteOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.penalty_factor.is_finite() || self.penalty_factor < 1.0 {
            return Err(Error::InvalidData(format!(
                "penalty_factor must be a number >= 1, got {}",
                self.penalty_factor
            )));
        }
        Ok(())
    }
}
