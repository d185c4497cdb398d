use geo::LineString;

use super::model::{CityModel, CityObject, Geometry, RoadAttributes};
use super::vertices::Point3;
use crate::error::ConvertError;
use crate::geo_core::CoordinateTransformer;
use crate::geometric::buffer::GeometryBufferer;
use crate::geometric::road::RoadFeature;

/// LoD label of the centerline
pub const LOD_CENTERLINE: &str = "0.1";

/// LoD label of the buffered footprint
pub const LOD_FOOTPRINT: &str = "1";

/// What happened to the model's object map when a feature was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Inserted,
    /// An object with the same identifier existed and was replaced
    Replaced,
}

/// Turns one road feature into one city object.
///
/// Both geometries are computed before anything is appended, so a feature
/// that fails leaves the vertex pool as it was.
pub struct CityObjectBuilder {
    transformer: Box<dyn CoordinateTransformer>,
    bufferer: Box<dyn GeometryBufferer>,
    buffer_distance: f64,
}

impl CityObjectBuilder {
    pub fn new(
        transformer: Box<dyn CoordinateTransformer>,
        bufferer: Box<dyn GeometryBufferer>,
        buffer_distance: f64,
    ) -> Self {
        CityObjectBuilder {
            transformer,
            bufferer,
            buffer_distance,
        }
    }

    pub fn buffer_distance(&self) -> f64 {
        self.buffer_distance
    }

    /// Build the city object for `feature` and store it in `model`.
    ///
    /// Errors are tagged with the feature's `osm_id`.
    pub fn build(
        &self,
        feature: &RoadFeature,
        model: &mut CityModel,
    ) -> Result<BuildOutcome, ConvertError> {
        self.build_object(feature, model)
            .map_err(|e| e.for_feature(&feature.osm_id))
    }

    fn build_object(
        &self,
        feature: &RoadFeature,
        model: &mut CityModel,
    ) -> Result<BuildOutcome, ConvertError> {
        let (centerline, outline) = self.compute_geometries(&feature.geometry)?;

        let line_indices = model
            .vertices
            .append(centerline.coords().map(Point3::from));
        // The buffer ring goes in reversed so outer rings are counter-clockwise
        let ring_indices = model
            .vertices
            .append(outline.coords().rev().map(Point3::from));

        let object = CityObject::road(
            RoadAttributes {
                osm_id: feature.osm_id.clone(),
                road_type: feature.highway.clone().unwrap_or_default(),
                name: feature.name.clone(),
            },
            vec![
                Geometry::MultiLineString {
                    lod: LOD_CENTERLINE.to_string(),
                    boundaries: vec![line_indices],
                },
                Geometry::MultiSurface {
                    lod: LOD_FOOTPRINT.to_string(),
                    boundaries: vec![vec![ring_indices]],
                },
            ],
        );

        match model.insert(feature.osm_id.clone(), object) {
            Some(_) => Ok(BuildOutcome::Replaced),
            None => Ok(BuildOutcome::Inserted),
        }
    }

    /// Reprojected centerline and buffer outline (native order)
    fn compute_geometries(
        &self,
        line: &LineString<f64>,
    ) -> Result<(LineString<f64>, LineString<f64>), ConvertError> {
        if line.0.len() < 2 {
            return Err(ConvertError::UnsupportedGeometry(format!(
                "line has {} point(s), at least 2 are needed",
                line.0.len()
            )));
        }

        let centerline = self.transformer.transform_line(line)?;
        if centerline.0.len() != line.0.len() {
            return Err(ConvertError::Projection(format!(
                "reprojection changed point count from {} to {}",
                line.0.len(),
                centerline.0.len()
            )));
        }

        let outline = self.bufferer.outline(&centerline, self.buffer_distance)?;
        if outline.0.is_empty() {
            return Err(ConvertError::BufferComputation(
                "empty outline".to_string(),
            ));
        }

        Ok((centerline, outline))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geo::Coord;

    /// Shifts every point by a fixed offset
    pub(crate) struct ShiftTransformer {
        pub dx: f64,
        pub dy: f64,
    }

    impl CoordinateTransformer for ShiftTransformer {
        fn transform_line(&self, line: &LineString<f64>) -> Result<LineString<f64>, ConvertError> {
            Ok(line
                .coords()
                .map(|c| Coord {
                    x: c.x + self.dx,
                    y: c.y + self.dy,
                })
                .collect())
        }
    }

    /// Fails on any line whose first x coordinate is negative
    pub(crate) struct FailingTransformer;

    impl CoordinateTransformer for FailingTransformer {
        fn transform_line(&self, line: &LineString<f64>) -> Result<LineString<f64>, ConvertError> {
            match line.0.first() {
                Some(c) if c.x < 0.0 => Err(ConvertError::Projection(format!(
                    "({}, {}) outside datum bounds",
                    c.x, c.y
                ))),
                _ => Ok(line.clone()),
            }
        }
    }

    /// Returns an 8-point outline around the first point: a square with edge midpoints,
    /// listed clockwise and not closed, so every point is distinct
    pub(crate) struct OctagonBufferer;

    impl OctagonBufferer {
        pub(crate) fn native_outline(line: &LineString<f64>, d: f64) -> Vec<Coord<f64>> {
            let c = line.0[0];
            [
                (-d, d),
                (0.0, d),
                (d, d),
                (d, 0.0),
                (d, -d),
                (0.0, -d),
                (-d, -d),
                (-d, 0.0),
            ]
            .iter()
            .map(|(dx, dy)| Coord {
                x: c.x + dx,
                y: c.y + dy,
            })
            .collect()
        }
    }

    impl GeometryBufferer for OctagonBufferer {
        fn outline(
            &self,
            line: &LineString<f64>,
            distance: f64,
        ) -> Result<LineString<f64>, ConvertError> {
            Ok(LineString::new(Self::native_outline(line, distance)))
        }
    }

    pub(crate) fn three_point_line() -> LineString<f64> {
        LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (20.0, 5.0)])
    }

    fn builder() -> CityObjectBuilder {
        CityObjectBuilder::new(
            Box::new(ShiftTransformer { dx: 1000.0, dy: 2000.0 }),
            Box::new(OctagonBufferer),
            5.0,
        )
    }

    #[test]
    fn test_single_residential_feature() {
        let mut model = CityModel::new();
        let feature = RoadFeature::new("W1", Some("residential"), three_point_line());

        let outcome = builder().build(&feature, &mut model).unwrap();

        assert_eq!(outcome, BuildOutcome::Inserted);
        assert_eq!(model.vertices.len(), 11);

        let object = model.get("W1").unwrap();
        assert_eq!(
            object.geometry[0],
            Geometry::MultiLineString {
                lod: "0.1".to_string(),
                boundaries: vec![vec![0, 1, 2]],
            }
        );
        assert_eq!(
            object.geometry[1],
            Geometry::MultiSurface {
                lod: "1".to_string(),
                boundaries: vec![vec![vec![3, 4, 5, 6, 7, 8, 9, 10]]],
            }
        );
    }

    #[test]
    fn test_centerline_vertices_are_reprojected_in_order() {
        let mut model = CityModel::new();
        let feature = RoadFeature::new("W1", Some("primary"), three_point_line());

        builder().build(&feature, &mut model).unwrap();

        assert_eq!(model.vertices.get(0), Some(&Point3::new(1000.0, 2000.0, 0.0)));
        assert_eq!(model.vertices.get(1), Some(&Point3::new(1010.0, 2000.0, 0.0)));
        assert_eq!(model.vertices.get(2), Some(&Point3::new(1020.0, 2005.0, 0.0)));
    }

    #[test]
    fn test_footprint_is_reversed_outline() {
        let mut model = CityModel::new();
        let feature = RoadFeature::new("W1", Some("primary"), three_point_line());

        builder().build(&feature, &mut model).unwrap();

        let projected = ShiftTransformer { dx: 1000.0, dy: 2000.0 }
            .transform_line(&feature.geometry)
            .unwrap();
        let native = OctagonBufferer::native_outline(&projected, 5.0);

        let ring = model.get("W1").unwrap().geometry_for_lod(LOD_FOOTPRINT).unwrap().indices();
        let stored: Vec<Point3> = ring.iter().map(|i| *model.vertices.get(*i).unwrap()).collect();
        let expected: Vec<Point3> = native.iter().rev().map(Point3::from).collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_attributes() {
        let mut model = CityModel::new();
        let named = RoadFeature::new("W1", Some("service"), three_point_line()).with_name("Haagweg");
        let unnamed = RoadFeature::new("W2", Some("track"), three_point_line());

        let b = builder();
        b.build(&named, &mut model).unwrap();
        b.build(&unnamed, &mut model).unwrap();

        let attributes = &model.get("W1").unwrap().attributes;
        assert_eq!(attributes.osm_id, "W1");
        assert_eq!(attributes.road_type, "service");
        assert_eq!(attributes.name.as_deref(), Some("Haagweg"));
        assert_eq!(model.get("W2").unwrap().attributes.name, None);
    }

    #[test]
    fn test_duplicate_id_replaces_and_keeps_vertices() {
        let mut model = CityModel::new();
        let b = builder();
        let first = RoadFeature::new("X", Some("primary"), three_point_line()).with_name("first");
        let second = RoadFeature::new(
            "X",
            Some("secondary"),
            LineString::from(vec![(50.0, 50.0), (60.0, 50.0)]),
        );

        assert_eq!(b.build(&first, &mut model).unwrap(), BuildOutcome::Inserted);
        assert_eq!(b.build(&second, &mut model).unwrap(), BuildOutcome::Replaced);

        assert_eq!(model.len(), 1);
        assert_eq!(model.vertices.len(), 11 + 10);

        let object = model.get("X").unwrap();
        assert_eq!(object.attributes.road_type, "secondary");
        assert_eq!(object.vertex_indices(), (11..21).collect::<Vec<_>>());
    }

    #[test]
    fn test_projection_failure_leaves_pool_untouched() {
        let mut model = CityModel::new();
        let b = CityObjectBuilder::new(Box::new(FailingTransformer), Box::new(OctagonBufferer), 5.0);
        let bad = RoadFeature::new(
            "W9",
            Some("primary"),
            LineString::from(vec![(-1.0, 0.0), (1.0, 0.0)]),
        );

        let err = b.build(&bad, &mut model).unwrap_err();

        assert_eq!(err.osm_id(), Some("W9"));
        assert!(matches!(err.root(), ConvertError::Projection(_)));
        assert!(model.vertices.is_empty());
        assert!(model.is_empty());
    }

    #[test]
    fn test_single_point_line_is_unsupported() {
        let mut model = CityModel::new();
        let feature = RoadFeature::new("N1", Some("road"), LineString::from(vec![(1.0, 1.0)]));

        let err = builder().build(&feature, &mut model).unwrap_err();

        assert!(matches!(err.root(), ConvertError::UnsupportedGeometry(_)));
        assert!(model.vertices.is_empty());
    }

    #[test]
    fn test_with_geos_bufferer() {
        use crate::geometric::buffer::GeosBufferer;

        let mut model = CityModel::new();
        let b = CityObjectBuilder::new(
            Box::new(ShiftTransformer { dx: 0.0, dy: 0.0 }),
            Box::new(GeosBufferer::default()),
            5.0,
        );
        let feature = RoadFeature::new("W1", Some("residential"), three_point_line());

        b.build(&feature, &mut model).unwrap();

        let outline = GeosBufferer::default()
            .outline(&feature.geometry, 5.0)
            .unwrap();
        let object = model.get("W1").unwrap();
        let ring = object.geometry_for_lod(LOD_FOOTPRINT).unwrap().indices();

        assert_eq!(ring.len(), outline.0.len());
        assert_eq!(model.vertices.len(), 3 + outline.0.len());
        assert_eq!(
            model.vertices.get(ring[0]),
            Some(&Point3::from(outline.0[outline.0.len() - 1]))
        );
    }

    #[test]
    fn test_geos_footprint_is_counter_clockwise() {
        use crate::geometric::buffer::GeosBufferer;
        use geo::{Area, Polygon, Winding};

        let mut model = CityModel::new();
        let b = CityObjectBuilder::new(
            Box::new(ShiftTransformer { dx: 0.0, dy: 0.0 }),
            Box::new(GeosBufferer::default()),
            5.0,
        );
        let feature = RoadFeature::new("W1", Some("residential"), three_point_line());
        b.build(&feature, &mut model).unwrap();

        let ring = model.get("W1").unwrap().geometry_for_lod(LOD_FOOTPRINT).unwrap().indices();
        let stored = LineString::from(
            ring.iter()
                .map(|i| {
                    let p = model.vertices.get(*i).unwrap();
                    (p.x(), p.y())
                })
                .collect::<Vec<_>>(),
        );

        assert!(stored.is_closed());
        assert!(stored.is_ccw());
        assert!(Polygon::new(stored, vec![]).signed_area() > 0.0);
    }
}
