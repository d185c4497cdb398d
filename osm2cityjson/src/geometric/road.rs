use geo::LineString;

/// `highway` values accepted as roads
pub const HIGHWAY_TYPES: [&str; 20] = [
    "primary",
    "secondary",
    "motorway",
    "trunk",
    "tertiary",
    "unclassified",
    "residential",
    "motorway_link",
    "trunk_link",
    "primary_link",
    "secondary_link",
    "tertiary_link",
    "living_street",
    "service",
    "pedestrian",
    "track",
    "bus_guideway",
    "escape",
    "raceway",
    "road",
];

/// Road structure
/// One line feature read from an OSM extract, with the attributes the city model needs
#[derive(Debug, Clone, PartialEq)]
pub struct RoadFeature {
    /// Stable OSM identifier, used as the city object key
    pub osm_id: String,
    /// Road type tag (OSM `highway`)
    pub highway: Option<String>,
    /// Display name (OSM `name`)
    pub name: Option<String>,
    /// Centerline, in source CRS coordinates
    pub geometry: LineString<f64>,
}

impl RoadFeature {
    /// Create a new RoadFeature without a name
    pub fn new(osm_id: impl Into<String>, highway: Option<&str>, geometry: LineString<f64>) -> Self {
        RoadFeature {
            osm_id: osm_id.into(),
            highway: highway.map(str::to_string),
            name: None,
            geometry,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of points of the centerline
    pub fn point_count(&self) -> usize {
        self.geometry.0.len()
    }

    pub fn is_road(&self) -> bool {
        is_road(self)
    }
}

/// True if the feature's `highway` tag is one of [`HIGHWAY_TYPES`]
pub fn is_road(feature: &RoadFeature) -> bool {
    feature.highway.as_deref().map_or(false, is_road_type)
}

/// Exact, case-sensitive membership test against [`HIGHWAY_TYPES`]
pub fn is_road_type(highway: &str) -> bool {
    HIGHWAY_TYPES.contains(&highway)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> LineString<f64> {
        LineString::from(vec![(4.77, 51.58), (4.78, 51.59)])
    }

    #[test]
    fn test_every_highway_type_is_road() {
        for highway in HIGHWAY_TYPES {
            let feature = RoadFeature::new("W1", Some(highway), line());
            assert!(is_road(&feature), "{} should be a road", highway);
        }
    }

    #[test]
    fn test_unlisted_highway_is_not_road() {
        for highway in ["footway", "cycleway", "steps", "path", "proposed", "", "Residential"] {
            let feature = RoadFeature::new("W1", Some(highway), line());
            assert!(!feature.is_road(), "{:?} should not be a road", highway);
        }
    }

    #[test]
    fn test_missing_highway_is_not_road() {
        let feature = RoadFeature::new("W1", None, line());
        assert!(!is_road(&feature));
    }

    #[test]
    fn test_road_feature_with_name() {
        let feature = RoadFeature::new("W42", Some("residential"), line()).with_name("Haagweg");
        assert_eq!(feature.osm_id, "W42");
        assert_eq!(feature.name.as_deref(), Some("Haagweg"));
        assert_eq!(feature.point_count(), 2);
    }
}
