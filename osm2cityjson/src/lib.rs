pub mod cityjson;
pub mod collect;
pub mod commons;
pub mod convert;
pub mod error;
pub mod geo_core;
pub mod geometric;

pub use cityjson::{CityModel, CityObject, Point3, VertexPool};
pub use convert::{ConversionSummary, ConvertOptions, ErrorPolicy, Osm2CityJson};
pub use error::ConvertError;
pub use geometric::road::RoadFeature;
