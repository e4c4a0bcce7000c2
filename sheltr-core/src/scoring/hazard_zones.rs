use std::io::Read;

use geo::{BooleanOps, BoundingRect, Contains, Intersects, LineString, MultiLineString, Polygon};
use geojson::FeatureCollection;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use wkt::TryFromWkt;

use super::{BoxEnvelope, ScoreEdge, envelope_query, validate_geometry};
use crate::Error;
use crate::geometry::line_length;

/// How overlapping hazard exposures are merged into one score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Worst single exposure
    #[default]
    Max,
    /// Sum of all exposures, clamped to 1
    WeightedSum,
}

/// Hazard polygon (flood plain, landslide zone, ...) with a severity in `[0, 1]`
#[derive(Debug, Clone)]
pub struct HazardZone {
    pub polygon: Polygon<f64>,
    pub severity: f64,
    pub name: Option<String>,
}

impl HazardZone {
    pub fn new(polygon: Polygon<f64>, severity: f64) -> Self {
        Self {
            polygon,
            severity,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parses a `POLYGON` in WKT (lon lat order)
    pub fn from_wkt(wkt: &str, severity: f64) -> Result<Self, Error> {
        let polygon = Polygon::try_from_wkt_str(wkt)
            .map_err(|e| Error::InvalidData(format!("Failed to parse hazard zone WKT: {e}")))?;
        Ok(Self::new(polygon, severity))
    }

    /// Reads hazard zones from a GeoJSON `FeatureCollection`.
    ///
    /// Severity comes from the `severity` property, falling back to `risk`.
    /// Features carrying neither are full-severity zones (`1.0`); a present
    /// but non-numeric value is an error. `MultiPolygon` features are split
    /// into one zone per polygon; other geometry types are rejected.
    pub fn from_geojson_reader<R: Read>(reader: R) -> Result<Vec<Self>, Error> {
        let collection: FeatureCollection = serde_json::from_reader(reader)?;
        let mut zones = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            let severity = match feature
                .property("severity")
                .or_else(|| feature.property("risk"))
            {
                None => 1.0,
                Some(value) => value.as_f64().ok_or_else(|| {
                    Error::GeoJsonError(format!("hazard severity must be a number, got {value}"))
                })?,
            };
            let name = feature
                .property("name")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string);

            let Some(geometry) = feature.geometry else {
                return Err(Error::GeoJsonError(
                    "hazard feature without geometry".to_string(),
                ));
            };
            let geometry = geo::Geometry::<f64>::try_from(geometry)
                .map_err(|e| Error::GeoJsonError(e.to_string()))?;

            let polygons = match geometry {
                geo::Geometry::Polygon(polygon) => vec![polygon],
                geo::Geometry::MultiPolygon(multi) => multi.0,
                other => {
                    return Err(Error::GeoJsonError(format!(
                        "hazard zones must be polygons, got {other:?}"
                    )));
                }
            };
            zones.extend(polygons.into_iter().map(|polygon| HazardZone {
                polygon,
                severity,
                name: name.clone(),
            }));
        }

        Ok(zones)
    }

    /// Share of the segment's length lying inside the polygon
    fn covered_fraction(&self, geometry: &LineString<f64>, total_length: f64) -> f64 {
        if !self.polygon.intersects(geometry) {
            return 0.0;
        }
        if total_length <= 0.0 || self.polygon.contains(geometry) {
            return 1.0;
        }

        // Partial overlap only; clipping is not exact to the last ulp
        let clipped = self
            .polygon
            .clip(&MultiLineString::new(vec![geometry.clone()]), false);
        let inside: f64 = clipped.iter().map(line_length).sum();
        (inside / total_length).clamp(0.0, 1.0)
    }
}

/// Scores a segment by how much of it runs through hazard polygons
pub struct HazardZoneScorer {
    zones: Vec<HazardZone>,
    index: RTree<BoxEnvelope>,
    combine: Combine,
}

impl std::fmt::Debug for HazardZoneScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HazardZoneScorer")
            .field("zones", &self.zones.len())
            .field("combine", &self.combine)
            .finish()
    }
}

impl Clone for HazardZoneScorer {
    fn clone(&self) -> Self {
        Self {
            zones: self.zones.clone(),
            index: self.index.clone(),
            combine: self.combine,
        }
    }
}

impl HazardZoneScorer {
    pub fn new(zones: Vec<HazardZone>, combine: Combine) -> Result<Self, Error> {
        for zone in &zones {
            if !(0.0..=1.0).contains(&zone.severity) {
                return Err(Error::InvalidData(format!(
                    "Hazard zone severity must be within [0, 1], got {}",
                    zone.severity
                )));
            }
            if zone.polygon.bounding_rect().is_none() {
                return Err(Error::InvalidData("Hazard zone polygon is empty".to_string()));
            }
        }

        let index = RTree::bulk_load(envelopes(&zones));
        log::debug!("Indexed {} hazard zones ({combine:?})", zones.len());

        Ok(Self {
            zones,
            index,
            combine,
        })
    }
}

impl ScoreEdge for HazardZoneScorer {
    fn score(&self, geometry: &LineString<f64>, _length_m: f64) -> Result<f64, Error> {
        validate_geometry(geometry)?;
        let query = envelope_query(geometry)?;

        // Sorted so that summation order, and therefore the result, does not
        // depend on the tree layout
        let mut candidates: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.item)
            .collect();
        candidates.sort_unstable();

        let total_length = line_length(geometry);
        let exposures = candidates.into_iter().map(|zone| {
            let zone = &self.zones[zone];
            zone.covered_fraction(geometry, total_length) * zone.severity
        });

        let risk = match self.combine {
            Combine::Max => exposures.fold(0.0, f64::max),
            Combine::WeightedSum => exposures.sum(),
        };
        Ok(risk.clamp(0.0, 1.0))
    }
}

fn envelopes(zones: &[HazardZone]) -> Vec<BoxEnvelope> {
    zones
        .iter()
        .enumerate()
        .filter_map(|(item, zone)| BoxEnvelope::of(item, &zone.polygon))
        .collect()
}
