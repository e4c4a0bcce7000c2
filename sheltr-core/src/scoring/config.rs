use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use geo::Point;
use serde::{Deserialize, Serialize};

use super::{
    BlockedRoadsScorer, Combine, CompositeScorer, HazardZone, HazardZoneScorer, RiskScorer,
    SeededScorer, ShelterProximityScorer,
};
use crate::Error;

/// Scorer selection, deserializable from the `[scorer]` table of a TOML or
/// JSON configuration and discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorerConfig {
    Seeded {
        #[serde(default = "default_seed")]
        seed: u64,
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
    HazardZones {
        #[serde(default)]
        combine: Combine,
        #[serde(default)]
        zones: Vec<HazardZoneConfig>,
        /// GeoJSON `FeatureCollection` with additional zones
        #[serde(default)]
        geojson_path: Option<PathBuf>,
    },
    BlockedRoads {
        /// `LINESTRING` / `MULTILINESTRING` geometries in WKT, lon lat order
        #[serde(default)]
        roads: Vec<String>,
        /// GeoJSON `FeatureCollection` with additional blocked roads
        #[serde(default)]
        geojson_path: Option<PathBuf>,
    },
    ShelterProximity {
        /// Shelter locations as `[lat, lon]`
        shelters: Vec<[f64; 2]>,
        #[serde(default = "default_max_shelter_distance")]
        max_distance_m: f64,
    },
    Composite {
        components: Vec<WeightedScorerConfig>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZoneConfig {
    /// `POLYGON` in WKT, lon lat order
    pub wkt: String,
    #[serde(default = "default_severity")]
    pub severity: f64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedScorerConfig {
    pub weight: f64,
    pub scorer: ScorerConfig,
}

fn default_seed() -> u64 {
    42
}

fn default_amplitude() -> f64 {
    1.0
}

fn default_severity() -> f64 {
    1.0
}

fn default_max_shelter_distance() -> f64 {
    1000.0
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig::Seeded {
            seed: default_seed(),
            amplitude: default_amplitude(),
        }
    }
}

impl ScorerConfig {
    /// Instantiates the configured scorer, reading any referenced hazard files
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters or unreadable zone files
    pub fn build(&self) -> Result<RiskScorer, Error> {
        let scorer = match self {
            ScorerConfig::Seeded { seed, amplitude } => SeededScorer::new(*seed, *amplitude)?.into(),
            ScorerConfig::HazardZones {
                combine,
                zones,
                geojson_path,
            } => {
                let mut hazard_zones = zones
                    .iter()
                    .map(|zone| {
                        let hazard = HazardZone::from_wkt(&zone.wkt, zone.severity)?;
                        Ok(match &zone.name {
                            Some(name) => hazard.with_name(name.clone()),
                            None => hazard,
                        })
                    })
                    .collect::<Result<Vec<_>, Error>>()?;

                if let Some(path) = geojson_path {
                    let loaded = HazardZone::from_geojson_reader(open_layer(path)?)?;
                    log::info!("Loaded {} hazard zones from {}", loaded.len(), path.display());
                    hazard_zones.extend(loaded);
                }

                HazardZoneScorer::new(hazard_zones, *combine)?.into()
            }
            ScorerConfig::BlockedRoads {
                roads,
                geojson_path,
            } => {
                let mut blocked = Vec::new();
                for wkt in roads {
                    blocked.extend(BlockedRoadsScorer::roads_from_wkt(wkt)?);
                }

                if let Some(path) = geojson_path {
                    let loaded = BlockedRoadsScorer::roads_from_geojson_reader(open_layer(path)?)?;
                    log::info!("Loaded {} blocked roads from {}", loaded.len(), path.display());
                    blocked.extend(loaded);
                }

                BlockedRoadsScorer::new(blocked)?.into()
            }
            ScorerConfig::ShelterProximity {
                shelters,
                max_distance_m,
            } => {
                let shelters = shelters
                    .iter()
                    .map(|[lat, lon]| Point::new(*lon, *lat))
                    .collect();
                ShelterProximityScorer::new(shelters, *max_distance_m)?.into()
            }
            ScorerConfig::Composite { components } => {
                let components = components
                    .iter()
                    .map(|c| Ok((c.weight, c.scorer.build()?)))
                    .collect::<Result<Vec<_>, Error>>()?;
                CompositeScorer::new(components)?.into()
            }
        };
        Ok(scorer)
    }
}

fn open_layer(path: &Path) -> Result<BufReader<File>, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open hazard layer '{}': {}", path.display(), e),
        )
    })?;
    Ok(BufReader::new(file))
}
