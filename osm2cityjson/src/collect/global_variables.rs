/// Geographic CRS of OpenStreetMap data (WGS84)
pub const DEFAULT_SOURCE_EPSG: u32 = 4326;

/// Planar CRS of the output model (Amersfoort / RD New)
pub const DEFAULT_TARGET_EPSG: u32 = 28992;

/// Half-width of the road footprint, in target CRS units
pub const DEFAULT_BUFFER_DISTANCE: f64 = 5.0;

/// Segments per quarter circle when rounding buffer caps (same as OGR)
pub const DEFAULT_QUADRANT_SEGMENTS: i32 = 30;

/// Layer of the GDAL OSM driver holding line features
pub const DEFAULT_LAYER: &str = "lines";

pub const CITYJSON_TYPE: &str = "CityJSON";
pub const CITYJSON_VERSION: &str = "1.0";
