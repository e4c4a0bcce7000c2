use geo::{LineString, Point};

use super::{ScoreEdge, validate_geometry};
use crate::Error;
use crate::geometry::{midpoint, point_distance};

/// Scores a segment by how far its midpoint lies from the closest shelter:
/// `0` next to a shelter, rising linearly to `1` at `max_distance_m`.
#[derive(Debug, Clone)]
pub struct ShelterProximityScorer {
    shelters: Vec<Point<f64>>,
    max_distance_m: f64,
}

impl ShelterProximityScorer {
    pub fn new(shelters: Vec<Point<f64>>, max_distance_m: f64) -> Result<Self, Error> {
        if shelters.is_empty() {
            return Err(Error::InvalidData(
                "Shelter proximity scorer needs at least one shelter".to_string(),
            ));
        }
        if !max_distance_m.is_finite() || max_distance_m <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Shelter distance cap must be positive, got {max_distance_m}"
            )));
        }
        Ok(Self {
            shelters,
            max_distance_m,
        })
    }
}

impl ScoreEdge for ShelterProximityScorer {
    fn score(&self, geometry: &LineString<f64>, _length_m: f64) -> Result<f64, Error> {
        validate_geometry(geometry)?;
        let mid = midpoint(geometry)
            .ok_or_else(|| Error::InvalidGeometry("empty geometry".to_string()))?;

        let nearest = self
            .shelters
            .iter()
            .map(|shelter| point_distance(&mid, shelter))
            .fold(f64::INFINITY, f64::min);

        Ok((nearest / self.max_distance_m).clamp(0.0, 1.0))
    }
}
