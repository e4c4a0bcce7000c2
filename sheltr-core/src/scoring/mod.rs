//! Hazard scoring of street segments
//!
//! Every scorer maps a segment geometry and its length to a risk score in
//! `[0, 1]`. The set of strategies is closed ([`RiskScorer`]) and selected
//! from configuration ([`ScorerConfig`]) when a graph is built, while the
//! [`ScoreEdge`] trait is the single capability the builder relies on.

mod blocked_roads;
mod config;
mod hazard_zones;
mod seeded;
mod shelters;

use geo::{BoundingRect, LineString, Rect};
use rstar::{AABB, RTreeObject};

pub use blocked_roads::BlockedRoadsScorer;
pub use config::{HazardZoneConfig, ScorerConfig, WeightedScorerConfig};
pub use hazard_zones::{Combine, HazardZone, HazardZoneScorer};
pub use seeded::SeededScorer;
pub use shelters::ShelterProximityScorer;

use crate::Error;
use crate::geometry::is_finite_coord;

/// Capability shared by all scoring strategies
pub trait ScoreEdge {
    /// Risk score in `[0, 1]` for one segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] for geometries with fewer than two
    /// coordinates or with non-finite coordinates.
    fn score(&self, geometry: &LineString<f64>, length_m: f64) -> Result<f64, Error>;
}

/// Closed set of scoring strategies
#[derive(Debug, Clone)]
pub enum RiskScorer {
    Seeded(SeededScorer),
    HazardZones(HazardZoneScorer),
    BlockedRoads(BlockedRoadsScorer),
    ShelterProximity(ShelterProximityScorer),
    Composite(CompositeScorer),
}

impl ScoreEdge for RiskScorer {
    fn score(&self, geometry: &LineString<f64>, length_m: f64) -> Result<f64, Error> {
        match self {
            RiskScorer::Seeded(scorer) => scorer.score(geometry, length_m),
            RiskScorer::HazardZones(scorer) => scorer.score(geometry, length_m),
            RiskScorer::BlockedRoads(scorer) => scorer.score(geometry, length_m),
            RiskScorer::ShelterProximity(scorer) => scorer.score(geometry, length_m),
            RiskScorer::Composite(scorer) => scorer.score(geometry, length_m),
        }
    }
}

impl From<SeededScorer> for RiskScorer {
    fn from(scorer: SeededScorer) -> Self {
        RiskScorer::Seeded(scorer)
    }
}

impl From<HazardZoneScorer> for RiskScorer {
    fn from(scorer: HazardZoneScorer) -> Self {
        RiskScorer::HazardZones(scorer)
    }
}

impl From<BlockedRoadsScorer> for RiskScorer {
    fn from(scorer: BlockedRoadsScorer) -> Self {
        RiskScorer::BlockedRoads(scorer)
    }
}

impl From<ShelterProximityScorer> for RiskScorer {
    fn from(scorer: ShelterProximityScorer) -> Self {
        RiskScorer::ShelterProximity(scorer)
    }
}

impl From<CompositeScorer> for RiskScorer {
    fn from(scorer: CompositeScorer) -> Self {
        RiskScorer::Composite(scorer)
    }
}

/// Weighted sum of several hazard factors, clamped to `[0, 1]`
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    components: Vec<(f64, RiskScorer)>,
}

impl CompositeScorer {
    pub fn new(components: Vec<(f64, RiskScorer)>) -> Result<Self, Error> {
        if components.is_empty() {
            return Err(Error::InvalidData(
                "Composite scorer needs at least one component".to_string(),
            ));
        }
        if let Some((weight, _)) = components
            .iter()
            .find(|(weight, _)| !weight.is_finite() || *weight < 0.0)
        {
            return Err(Error::InvalidData(format!(
                "Composite scorer weight must be a non-negative number, got {weight}"
            )));
        }
        Ok(Self { components })
    }
}

impl ScoreEdge for CompositeScorer {
    fn score(&self, geometry: &LineString<f64>, length_m: f64) -> Result<f64, Error> {
        validate_geometry(geometry)?;
        let mut total = 0.0;
        for (weight, scorer) in &self.components {
            total += weight * scorer.score(geometry, length_m)?;
        }
        Ok(total.clamp(0.0, 1.0))
    }
}

/// Bounding box of one hazard geometry, keyed by its position in the
/// scorer's list
#[derive(Debug, Clone, Copy)]
pub(crate) struct BoxEnvelope {
    pub(crate) item: usize,
    envelope: AABB<[f64; 2]>,
}

impl BoxEnvelope {
    pub(crate) fn of<G>(item: usize, geometry: &G) -> Option<Self>
    where
        G: BoundingRect<f64, Output = Option<Rect<f64>>>,
    {
        geometry.bounding_rect().map(|rect| Self {
            item,
            envelope: rect_envelope(rect),
        })
    }
}

impl RTreeObject for BoxEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Envelope of a validated segment for R-tree candidate lookup
pub(crate) fn envelope_query(geometry: &LineString<f64>) -> Result<AABB<[f64; 2]>, Error> {
    geometry
        .bounding_rect()
        .map(rect_envelope)
        .ok_or_else(|| Error::InvalidGeometry("empty geometry".to_string()))
}

fn rect_envelope(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

pub(crate) fn validate_geometry(geometry: &LineString<f64>) -> Result<(), Error> {
    if geometry.0.len() < 2 {
        return Err(Error::InvalidGeometry(format!(
            "expected at least 2 coordinates, got {}",
            geometry.0.len()
        )));
    }
    if !geometry.coords().all(is_finite_coord) {
        return Err(Error::InvalidGeometry(
            "geometry contains non-finite coordinates".to_string(),
        ));
    }
    Ok(())
}
