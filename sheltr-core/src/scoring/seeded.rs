use geo::{Coord, LineString};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::{ScoreEdge, validate_geometry};
use crate::Error;

/// Deterministic pseudo-random scorer.
///
/// The score is derived from a hash of the segment's endpoint coordinates,
/// so it depends only on where the segment is and never on the order in
/// which edges are visited. Rebuilding the same network yields bit-identical
/// scores.
#[derive(Debug, Clone)]
pub struct SeededScorer {
    seed: u64,
    amplitude: f64,
}

impl SeededScorer {
    /// `amplitude` scales the unit hash value, e.g. `0.05` for a barely
    /// noticeable background risk
    pub fn new(seed: u64, amplitude: f64) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&amplitude) {
            return Err(Error::InvalidData(format!(
                "Seeded scorer amplitude must be within [0, 1], got {amplitude}"
            )));
        }
        Ok(Self { seed, amplitude })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl ScoreEdge for SeededScorer {
    fn score(&self, geometry: &LineString<f64>, _length_m: f64) -> Result<f64, Error> {
        validate_geometry(geometry)?;
        let (Some(first), Some(last)) = (geometry.0.first(), geometry.0.last()) else {
            return Err(Error::InvalidGeometry("empty geometry".to_string()));
        };

        let hash = xxh3_64_with_seed(&endpoint_bytes(*first, *last), self.seed);
        Ok(unit_interval(hash) * self.amplitude)
    }
}

fn endpoint_bytes(first: Coord<f64>, last: Coord<f64>) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (chunk, value) in bytes
        .chunks_exact_mut(8)
        .zip([first.x, first.y, last.x, last.y])
    {
        // -0.0 and 0.0 describe the same place
        let value = if value == 0.0 { 0.0 } else { value };
        chunk.copy_from_slice(&value.to_bits().to_le_bytes());
    }
    bytes
}

/// Maps the top 53 bits of a hash onto `[0, 1)`
#[allow(clippy::cast_precision_loss)]
fn unit_interval(hash: u64) -> f64 {
    (hash >> 11) as f64 / (1u64 << 53) as f64
}
