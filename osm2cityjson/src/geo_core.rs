use geo::{Coord, Intersects, LineString, Rect};
use proj::Proj;
use std::str::FromStr;

use crate::collect::global_variables::{DEFAULT_SOURCE_EPSG, DEFAULT_TARGET_EPSG};
use crate::error::ConvertError;

/// CRS pair used by a conversion run
/// Features are read in `source_epsg` (geographic) and written in `target_epsg` (planar, metric)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoCore {
    /// EPSG code of the input coordinates
    pub source_epsg: u32,
    /// EPSG code of the output coordinates
    pub target_epsg: u32,
}

impl GeoCore {
    /// Create a new GeoCore for a source/target EPSG pair
    pub fn new(source_epsg: u32, target_epsg: u32) -> Self {
        GeoCore {
            source_epsg,
            target_epsg,
        }
    }

    /// Get source EPSG code
    pub fn get_source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Set source EPSG code
    pub fn set_source_epsg(&mut self, epsg: u32) {
        self.source_epsg = epsg;
    }

    /// Get target EPSG code
    pub fn get_target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Set target EPSG code
    pub fn set_target_epsg(&mut self, epsg: u32) {
        self.target_epsg = epsg;
    }

    /// OGC URN of the target CRS, as written in CityJSON metadata
    pub fn reference_system_urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.target_epsg)
    }

    /// Build the reprojection for this CRS pair
    pub fn transformer(&self) -> Result<ProjTransformer, ConvertError> {
        ProjTransformer::new(self.source_epsg, self.target_epsg)
    }
}

impl Default for GeoCore {
    /// WGS84 to Amersfoort / RD New
    fn default() -> Self {
        GeoCore::new(DEFAULT_SOURCE_EPSG, DEFAULT_TARGET_EPSG)
    }
}

/// Reprojects line geometries from a geographic CRS into a planar one.
///
/// Implementations must keep point count and order.
pub trait CoordinateTransformer {
    fn transform_line(&self, line: &LineString<f64>) -> Result<LineString<f64>, ConvertError>;
}

/// [`CoordinateTransformer`] backed by PROJ
pub struct ProjTransformer {
    proj: Proj,
    target_epsg: u32,
}

impl ProjTransformer {
    /// Create the PROJ pipeline between two EPSG codes.
    ///
    /// Axis order is normalized to lon/lat (x/y), whatever the CRS definition says.
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, ConvertError> {
        let from_crs = format!("EPSG:{}", source_epsg);
        let to_crs = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&from_crs, &to_crs, None).map_err(|e| {
            ConvertError::Projection(format!(
                "cannot create transformation {} -> {}: {}",
                from_crs, to_crs, e
            ))
        })?;

        Ok(ProjTransformer { proj, target_epsg })
    }
}

impl CoordinateTransformer for ProjTransformer {
    fn transform_line(&self, line: &LineString<f64>) -> Result<LineString<f64>, ConvertError> {
        let coords = line
            .coords()
            .enumerate()
            .map(|(i, coord)| {
                let (x, y) = self.proj.convert((coord.x, coord.y)).map_err(|e| {
                    ConvertError::Projection(format!(
                        "point {} ({}, {}): {}",
                        i, coord.x, coord.y, e
                    ))
                })?;

                // PROJ reports some out-of-area points as infinities instead of errors
                if !x.is_finite() || !y.is_finite() {
                    return Err(ConvertError::Projection(format!(
                        "point {} ({}, {}) is outside the area of EPSG:{}",
                        i, coord.x, coord.y, self.target_epsg
                    )));
                }

                Ok(Coord { x, y })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LineString::new(coords))
    }
}

/// Bounding box structure, in source CRS coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True if any part of the line lies inside (or on the edge of) the box
    pub fn intersects_line(&self, line: &LineString<f64>) -> bool {
        let rect = Rect::new(
            Coord {
                x: self.min_x,
                y: self.min_y,
            },
            Coord {
                x: self.max_x,
                y: self.max_y,
            },
        );
        rect.intersects(line)
    }
}

impl FromStr for BoundingBox {
    type Err = String;

    /// Parse `min_x,min_y,max_x,max_y`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid bbox {:?}: {}", s, e))?;

        match values.as_slice() {
            [min_x, min_y, max_x, max_y] if min_x <= max_x && min_y <= max_y => {
                Ok(BoundingBox::new(*min_x, *min_y, *max_x, *max_y))
            }
            [_, _, _, _] => Err(format!("invalid bbox {:?}: min must not exceed max", s)),
            _ => Err(format!(
                "invalid bbox {:?}: expected min_x,min_y,max_x,max_y",
                s
            )),
        }
    }
}
