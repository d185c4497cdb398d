pub mod geojson_collect;
pub mod global_variables;
#[cfg(feature = "gdal")]
pub mod osm_collect;

use std::path::Path;

use crate::commons::basic_functions::is_geojson_path;
use crate::error::ConvertError;
use crate::geometric::road::RoadFeature;
use geojson_collect::GeoJsonCollect;

/// Read road features from `path` and hand them to `visit` one by one.
///
/// `.geojson`/`.json` files are parsed in one go; anything else is opened
/// through GDAL and streamed from `layer_name`. Returns the number of
/// features read.
pub fn read_features<F>(path: &Path, layer_name: &str, mut visit: F) -> Result<usize, ConvertError>
where
    F: FnMut(RoadFeature) -> Result<(), ConvertError>,
{
    if is_geojson_path(path) {
        let roads = GeoJsonCollect::new(path).run()?;
        let count = roads.len();
        for road in roads {
            visit(road)?;
        }
        return Ok(count);
    }

    #[cfg(feature = "gdal")]
    {
        let mut collect = osm_collect::OsmCollect::new(path);
        collect.set_layer(layer_name);
        collect.for_each_road(visit)
    }

    #[cfg(not(feature = "gdal"))]
    {
        let _ = (layer_name, &mut visit);
        Err(ConvertError::SourceOpen {
            path: path.to_path_buf(),
            reason: "built without GDAL support; only GeoJSON input is available".to_string(),
        })
    }
}

/// Load every road feature of `path` in memory
pub fn load_features(path: &Path, layer_name: &str) -> Result<Vec<RoadFeature>, ConvertError> {
    let mut roads = Vec::new();
    read_features(path, layer_name, |road| {
        roads.push(road);
        Ok(())
    })?;
    Ok(roads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_features_from_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roads.geojson");
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"osm_id": "W1", "highway": "road"},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 0]]}}
            ]}"#,
        )
        .unwrap();

        let roads = load_features(&path, "lines").unwrap();
        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].osm_id, "W1");
    }

    #[test]
    fn test_read_features_stops_on_visit_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roads.geojson");
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"osm_id": "W1", "highway": "road"},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 0]]}},
                {"type": "Feature", "properties": {"osm_id": "W2", "highway": "road"},
                 "geometry": {"type": "LineString", "coordinates": [[2, 0], [3, 0]]}}
            ]}"#,
        )
        .unwrap();

        let mut seen = Vec::new();
        let result = read_features(&path, "lines", |road| {
            seen.push(road.osm_id.clone());
            Err(ConvertError::UnsupportedGeometry("stop".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(seen, vec!["W1".to_string()]);
    }

    #[test]
    fn test_load_features_missing_source() {
        let result = load_features(Path::new("missing/Breda extract.osm"), "lines");
        assert!(matches!(result, Err(ConvertError::SourceOpen { .. })));
    }
}
