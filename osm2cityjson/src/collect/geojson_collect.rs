use geo::{Coord, LineString};
use geojson::{feature::Id, Feature, GeoJson, Value};
use log::debug;
use std::path::PathBuf;

use crate::commons::basic_functions::json_value_to_string;
use crate::error::ConvertError;
use crate::geometric::road::RoadFeature;

/// Reads road features from a GeoJSON file
/// Features need `highway`, `osm_id` and (optionally) `name` properties and a LineString geometry
pub struct GeoJsonCollect {
    path: PathBuf,
}

impl GeoJsonCollect {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GeoJsonCollect { path: path.into() }
    }

    /// Read and parse the file
    pub fn run(&self) -> Result<Vec<RoadFeature>, ConvertError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ConvertError::SourceOpen {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        parse_geojson(&content).map_err(|reason| ConvertError::SourceOpen {
            path: self.path.clone(),
            reason,
        })
    }
}

/// Parse a GeoJSON `FeatureCollection` (or single `Feature`) into road features.
///
/// Features without a LineString geometry are skipped.
pub fn parse_geojson(content: &str) -> Result<Vec<RoadFeature>, String> {
    let geojson: GeoJson = content
        .parse()
        .map_err(|e| format!("invalid GeoJSON: {}", e))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err("GeoJSON must be a Feature or FeatureCollection".to_string())
        }
    };

    let mut roads = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        match feature_to_road(feature)? {
            Some(road) => roads.push(road),
            None => debug!("Skipping feature #{}: not a LineString", idx),
        }
    }

    Ok(roads)
}

fn feature_to_road(feature: &Feature) -> Result<Option<RoadFeature>, String> {
    let line = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(positions)) => positions_to_line(positions)?,
        _ => return Ok(None),
    };

    let property = |key: &str| feature.property(key).and_then(json_value_to_string);

    // `osm_id` property first, then the feature id
    let osm_id = property("osm_id")
        .or_else(|| match &feature.id {
            Some(Id::String(s)) => Some(s.clone()),
            Some(Id::Number(n)) => Some(n.to_string()),
            None => None,
        })
        .unwrap_or_default();

    Ok(Some(RoadFeature {
        osm_id,
        highway: property("highway"),
        name: property("name"),
        geometry: line,
    }))
}

fn positions_to_line(positions: &[Vec<f64>]) -> Result<LineString<f64>, String> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(format!("invalid position {:?}", position)),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}
