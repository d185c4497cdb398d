use gdal::vector::{Feature as GdalFeature, LayerAccess};
use gdal::Dataset;
use geo::{Geometry as GeoGeometry, LineString};
use geos::Geometry as GeosGeometry;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::collect::global_variables::DEFAULT_LAYER;
use crate::error::ConvertError;
use crate::geometric::road::RoadFeature;

/// Reads road features from an OSM file through GDAL's OSM driver
/// Any other OGR vector source with `osm_id`/`highway`/`name` fields works as well
pub struct OsmCollect {
    path: PathBuf,
    layer_name: String,
}

impl OsmCollect {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OsmCollect {
            path: path.into(),
            layer_name: DEFAULT_LAYER.to_string(),
        }
    }

    /// Set the layer to read (`lines` by default)
    pub fn set_layer(&mut self, layer_name: &str) {
        self.layer_name = layer_name.to_string();
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    /// Open the dataset and hand every line feature of the layer to `visit`, in layer order.
    ///
    /// Features are read one at a time; an error from `visit` stops the scan.
    pub fn for_each_road<F>(&self, mut visit: F) -> Result<usize, ConvertError>
    where
        F: FnMut(RoadFeature) -> Result<(), ConvertError>,
    {
        let dataset = Dataset::open(&self.path).map_err(|e| self.open_error(e.to_string()))?;

        let mut layer = dataset
            .layer_by_name(&self.layer_name)
            .map_err(|e| self.open_error(format!("no layer {:?}: {}", self.layer_name, e)))?;

        let mut read = 0usize;
        let mut skipped = 0usize;

        for feature in layer.features() {
            match Self::feature_to_road(&feature) {
                Some(road) => {
                    read += 1;
                    visit(road)?;
                }
                None => skipped += 1,
            }
        }

        info!(
            "Read {} line features from {:?} (layer {}, {} skipped)",
            read, self.path, self.layer_name, skipped
        );

        Ok(read)
    }

    fn feature_to_road(feature: &GdalFeature) -> Option<RoadFeature> {
        let osm_id = string_field(feature, "osm_id").unwrap_or_default();

        let line = match feature.geometry().map(gdal_to_line_string) {
            Some(Ok(line)) => line,
            Some(Err(reason)) => {
                debug!("Skipping feature {:?}: {}", osm_id, reason);
                return None;
            }
            None => {
                debug!("Skipping feature {:?}: no geometry", osm_id);
                return None;
            }
        };

        Some(RoadFeature {
            osm_id,
            highway: string_field(feature, "highway"),
            name: string_field(feature, "name"),
            geometry: line,
        })
    }

    fn open_error(&self, reason: String) -> ConvertError {
        ConvertError::SourceOpen {
            path: self.path.clone(),
            reason,
        }
    }
}

/// String value of a field; missing fields, nulls and empty strings give `None`
fn string_field(feature: &GdalFeature, name: &str) -> Option<String> {
    let idx = feature.field_index(name).ok()?;
    match feature.field_as_string(idx) {
        Ok(Some(value)) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Convert a GDAL geometry to a geo LineString, going through WKT and GEOS
fn gdal_to_line_string(geom: &gdal::vector::Geometry) -> Result<LineString<f64>, String> {
    let wkt = geom
        .wkt()
        .map_err(|e| format!("failed to get WKT: {}", e))?;

    let geos_geom =
        GeosGeometry::new_from_wkt(&wkt).map_err(|e| format!("failed to parse WKT: {}", e))?;

    let geo_geom: GeoGeometry<f64> = geos_geom
        .try_into()
        .map_err(|e| format!("failed to convert geometry: {}", e))?;

    match geo_geom {
        GeoGeometry::LineString(line) => Ok(line),
        other => Err(format!("unsupported geometry type {}", geometry_name(&other))),
    }
}

fn geometry_name(geom: &GeoGeometry<f64>) -> &'static str {
    match geom {
        GeoGeometry::Point(_) => "Point",
        GeoGeometry::Line(_) => "Line",
        GeoGeometry::LineString(_) => "LineString",
        GeoGeometry::Polygon(_) => "Polygon",
        GeoGeometry::MultiPoint(_) => "MultiPoint",
        GeoGeometry::MultiLineString(_) => "MultiLineString",
        GeoGeometry::MultiPolygon(_) => "MultiPolygon",
        GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        GeoGeometry::Rect(_) => "Rect",
        GeoGeometry::Triangle(_) => "Triangle",
    }
}
