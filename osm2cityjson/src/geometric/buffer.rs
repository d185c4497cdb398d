use geo::{Area, Geometry as GeoGeometry, LineString, Polygon};
use geos::{CoordSeq, Geom, Geometry as GeosGeometry};
use log::warn;

use crate::collect::global_variables::DEFAULT_QUADRANT_SEGMENTS;
use crate::error::ConvertError;

/// Computes the outline of a fixed-distance buffer around a line.
///
/// The returned ring is the buffer's exterior, in the engine's own point
/// order. Holes are dropped.
pub trait GeometryBufferer {
    fn outline(&self, line: &LineString<f64>, distance: f64)
        -> Result<LineString<f64>, ConvertError>;
}

/// [`GeometryBufferer`] backed by GEOS
#[derive(Debug, Clone, Copy)]
pub struct GeosBufferer {
    quadrant_segments: i32,
}

impl GeosBufferer {
    /// Values below 1 are raised to 1
    pub fn new(quadrant_segments: i32) -> Self {
        if quadrant_segments < 1 {
            warn!(
                "quadrant segments must be at least 1, got {}; using 1",
                quadrant_segments
            );
        }
        GeosBufferer {
            quadrant_segments: quadrant_segments.max(1),
        }
    }

    pub fn quadrant_segments(&self) -> i32 {
        self.quadrant_segments
    }

    fn buffer_polygon(&self, line: &LineString<f64>, distance: f64) -> Result<Polygon<f64>, ConvertError> {
        let coords: Vec<[f64; 2]> = line.coords().map(|c| [c.x, c.y]).collect();
        let coord_seq = CoordSeq::new_from_vec(&coords).map_err(geos_error)?;
        let geos_line = GeosGeometry::create_line_string(coord_seq).map_err(geos_error)?;

        let buffered = geos_line
            .buffer(distance, self.quadrant_segments)
            .map_err(geos_error)?;
        if buffered.is_empty().map_err(geos_error)? {
            return Err(ConvertError::BufferComputation(
                "buffer is empty".to_string(),
            ));
        }

        let geo_geom: GeoGeometry<f64> = buffered.try_into().map_err(geos_error)?;

        match geo_geom {
            GeoGeometry::Polygon(polygon) => Ok(polygon),
            GeoGeometry::MultiPolygon(multi) => {
                warn!(
                    "buffer has {} parts, keeping the largest",
                    multi.0.len()
                );
                multi
                    .0
                    .into_iter()
                    .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
                    .ok_or_else(|| {
                        ConvertError::BufferComputation("buffer has no polygon".to_string())
                    })
            }
            _ => Err(ConvertError::BufferComputation(
                "buffer is not a polygon".to_string(),
            )),
        }
    }
}

impl Default for GeosBufferer {
    fn default() -> Self {
        GeosBufferer::new(DEFAULT_QUADRANT_SEGMENTS)
    }
}

impl GeometryBufferer for GeosBufferer {
    fn outline(
        &self,
        line: &LineString<f64>,
        distance: f64,
    ) -> Result<LineString<f64>, ConvertError> {
        check_distance(distance)?;

        let (exterior, _holes) = self.buffer_polygon(line, distance)?.into_inner();

        // A closed ring needs at least three distinct points plus the closing one
        if exterior.0.len() < 4 {
            return Err(ConvertError::BufferComputation(format!(
                "degenerate outline with {} point(s)",
                exterior.0.len()
            )));
        }

        Ok(exterior)
    }
}

/// A buffer distance must be finite and strictly positive
pub fn check_distance(distance: f64) -> Result<(), ConvertError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(ConvertError::BufferComputation(format!(
            "buffer distance must be positive, got {}",
            distance
        )));
    }
    Ok(())
}

fn geos_error(e: geos::Error) -> ConvertError {
    ConvertError::BufferComputation(e.to_string())
}
