//! Great-circle distances and the small set of geometric helpers shared by
//! the scorers, the network builder and the route engine.
//!
//! All coordinates follow the `geo` convention: `x` is longitude and `y` is
//! latitude, both in degrees.

use geo::{Coord, LineString, Point};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in metres
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let phi1 = a.y.to_radians();
    let phi2 = b.y.to_radians();
    let d_phi = (b.y - a.y).to_radians();
    let d_lambda = (b.x - a.x).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

pub fn point_distance(a: &Point<f64>, b: &Point<f64>) -> f64 {
    haversine_distance(a.0, b.0)
}

/// Great-circle length of a polyline in metres
pub fn line_length(line: &LineString<f64>) -> f64 {
    line.coords()
        .tuple_windows()
        .map(|(a, b)| haversine_distance(*a, *b))
        .sum()
}

/// Point halfway along the polyline, measured by great-circle length.
///
/// Interpolation inside a segment is linear in degrees, which is accurate
/// enough at street-segment scale.
pub fn midpoint(line: &LineString<f64>) -> Option<Point<f64>> {
    let first = *line.0.first()?;
    let half = line_length(line) / 2.0;
    if half <= 0.0 {
        return Some(first.into());
    }

    let mut walked = 0.0;
    for (a, b) in line.coords().tuple_windows() {
        let segment = haversine_distance(*a, *b);
        if walked + segment >= half {
            let t = if segment > 0.0 {
                (half - walked) / segment
            } else {
                0.0
            };
            return Some(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
        }
        walked += segment;
    }

    line.0.last().map(|c| Point::from(*c))
}

/// Position on the unit sphere (earth-centred cartesian).
///
/// Straight-line distance between two such positions grows monotonically
/// with their great-circle distance, so a euclidean nearest-neighbour search
/// over them ranks nodes exactly as [`haversine_distance`] would.
pub fn unit_sphere_position(point: &Point<f64>) -> [f64; 3] {
    let lat = point.y().to_radians();
    let lon = point.x().to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

pub fn is_finite_coord(coord: &Coord<f64>) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}

/// Rounded bounding box used as a cache key (4 decimal places)
pub type BboxKey = [i64; 4];

/// Geographic bounding box of an area of interest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, Error> {
        if ![north, south, east, west].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidData(
                "Bounding box coordinates must be finite".to_string(),
            ));
        }
        if north < south || east < west {
            return Err(Error::InvalidData(format!(
                "Degenerate bounding box: north={north}, south={south}, east={east}, west={west}"
            )));
        }
        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    /// Smallest box covering both points, expanded by `margin_deg` on every side
    pub fn around(a: &Point<f64>, b: &Point<f64>, margin_deg: f64) -> Self {
        Self {
            north: a.y().max(b.y()) + margin_deg,
            south: a.y().min(b.y()) - margin_deg,
            east: a.x().max(b.x()) + margin_deg,
            west: a.x().min(b.x()) - margin_deg,
        }
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        (self.south..=self.north).contains(&point.y())
            && (self.west..=self.east).contains(&point.x())
    }

    /// Key with every bound rounded to 4 decimal places, so that boxes
    /// differing by less than ~10 m share a cache entry
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded_key(&self) -> BboxKey {
        [self.north, self.south, self.east, self.west].map(|v| (v * 10_000.0).round() as i64)
    }
}
