use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{RiskFeature, export_risk_layer};
use crate::{Error, model::RiskGraph};

impl RiskFeature<'_> {
    /// Converts the edge to a `GeoJSON` `LineString` feature carrying its
    /// risk attributes.
    pub fn to_feature(&self) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeoJsonValue::from(self.geometry));

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "risk_score": self.risk_score,
                "risk_weight": self.risk_weight,
                "length_m": self.length_m,
                "source": self.source,
                "target": self.target,
            }
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

/// Risk overlay of the whole graph as a `GeoJSON` `FeatureCollection`
pub fn risk_layer_geojson(graph: &RiskGraph) -> Result<FeatureCollection, Error> {
    let features = export_risk_layer(graph)
        .iter()
        .map(RiskFeature::to_feature)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn risk_layer_geojson_string(graph: &RiskGraph) -> Result<String, Error> {
    serde_json::to_string(&risk_layer_geojson(graph)?)
        .map_err(|e| Error::GeoJsonError(e.to_string()))
}
