pub mod builder;
pub mod model;
pub mod vertices;

pub use builder::{BuildOutcome, CityObjectBuilder, LOD_CENTERLINE, LOD_FOOTPRINT};
pub use model::{CityModel, CityObject, CityObjectType, Geometry, Metadata, RoadAttributes};
pub use vertices::{Point3, VertexPool};
