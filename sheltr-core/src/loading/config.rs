use serde::{Deserialize, Serialize};

use crate::scoring::ScorerConfig;

/// Parameters of a graph build.
///
/// Passed explicitly to the builder, so graphs with different risk
/// policies can be built side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Amplification of hazard over distance in
    /// `risk_weight = length_m * (1 + risk_factor_weight * risk_score)`;
    /// `0` routes purely by distance
    pub risk_factor_weight: f64,
    /// Treatment of bridges and tunnels
    pub structures: StructurePolicy,
    pub scorer: ScorerConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            risk_factor_weight: 2.0,
            structures: StructurePolicy::Keep,
            scorer: ScorerConfig::default(),
        }
    }
}

/// What to do with bridge and tunnel segments, which may be unusable after
/// an earthquake
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StructurePolicy {
    /// Score them like any other segment
    #[default]
    Keep,
    /// Raise their risk score to at least `floor`
    Penalize { floor: f64 },
    /// Leave them out of the graph entirely
    Exclude,
}
