use std::io::Read;

use geo::{Geometry, Intersects, LineString};
use geojson::FeatureCollection;
use rstar::RTree;
use wkt::TryFromWkt;

use super::{BoxEnvelope, ScoreEdge, envelope_query, validate_geometry};
use crate::Error;

/// Scores a segment `1` when it touches any road reported as blocked
/// (debris, collapse, closures) and `0` otherwise
#[derive(Debug, Clone)]
pub struct BlockedRoadsScorer {
    roads: Vec<LineString<f64>>,
    index: RTree<BoxEnvelope>,
}

impl BlockedRoadsScorer {
    pub fn new(roads: Vec<LineString<f64>>) -> Result<Self, Error> {
        if let Some(road) = roads.iter().find(|road| validate_geometry(road).is_err()) {
            return Err(Error::InvalidData(format!(
                "Blocked road needs at least 2 finite coordinates, got {} points",
                road.0.len()
            )));
        }

        let index = RTree::bulk_load(
            roads
                .iter()
                .enumerate()
                .filter_map(|(item, road)| BoxEnvelope::of(item, road))
                .collect(),
        );
        log::debug!("Indexed {} blocked roads", roads.len());
        Ok(Self { roads, index })
    }

    /// Parses a `LINESTRING` or `MULTILINESTRING` in WKT (lon lat order)
    pub fn roads_from_wkt(wkt: &str) -> Result<Vec<LineString<f64>>, Error> {
        let geometry = Geometry::try_from_wkt_str(wkt)
            .map_err(|e| Error::InvalidData(format!("Failed to parse blocked road WKT: {e}")))?;
        split_lines(geometry).map_err(Error::InvalidData)
    }

    /// Reads blocked roads from a GeoJSON `FeatureCollection` of
    /// `LineString` / `MultiLineString` features
    pub fn roads_from_geojson_reader<R: Read>(reader: R) -> Result<Vec<LineString<f64>>, Error> {
        let collection: FeatureCollection = serde_json::from_reader(reader)?;
        let mut roads = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            let Some(geometry) = feature.geometry else {
                return Err(Error::GeoJsonError(
                    "blocked road feature without geometry".to_string(),
                ));
            };
            let geometry = Geometry::<f64>::try_from(geometry)
                .map_err(|e| Error::GeoJsonError(e.to_string()))?;
            roads.extend(split_lines(geometry).map_err(Error::GeoJsonError)?);
        }

        Ok(roads)
    }
}

fn split_lines(geometry: Geometry<f64>) -> Result<Vec<LineString<f64>>, String> {
    match geometry {
        Geometry::LineString(line) => Ok(vec![line]),
        Geometry::MultiLineString(multi) => Ok(multi.0),
        other => Err(format!("blocked roads must be line strings, got {other:?}")),
    }
}

impl ScoreEdge for BlockedRoadsScorer {
    fn score(&self, geometry: &LineString<f64>, _length_m: f64) -> Result<f64, Error> {
        validate_geometry(geometry)?;
        let query = envelope_query(geometry)?;

        let blocked = self
            .index
            .locate_in_envelope_intersecting(&query)
            .any(|entry| self.roads[entry.item].intersects(geometry));
        Ok(if blocked { 1.0 } else { 0.0 })
    }
}
