use geo::Coord;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A vertex of the city model, serialized as `[x, y, z]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3(pub f64, pub f64, pub f64);

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point3(x, y, z)
    }

    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn z(&self) -> f64 {
        self.2
    }
}

/// 2D coordinates are lifted to z = 0
impl From<Coord<f64>> for Point3 {
    fn from(coord: Coord<f64>) -> Self {
        Point3(coord.x, coord.y, 0.0)
    }
}

impl From<&Coord<f64>> for Point3 {
    fn from(coord: &Coord<f64>) -> Self {
        Point3::from(*coord)
    }
}

/// Append-only vertex array shared by every city object.
///
/// The position of a point is its index. Points are never removed or
/// merged, so an index handed out once stays valid for the whole model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexPool {
    points: Vec<Point3>,
}

impl VertexPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append points in order and return their indices.
    ///
    /// Indices are contiguous and start at the pool length before the call.
    pub fn append<I>(&mut self, points: I) -> Vec<usize>
    where
        I: IntoIterator<Item = Point3>,
    {
        self.append_range(points).collect()
    }

    /// Same as [`VertexPool::append`], returning the index range
    pub fn append_range<I>(&mut self, points: I) -> Range<usize>
    where
        I: IntoIterator<Item = Point3>,
    {
        let start = self.points.len();
        self.points.extend(points);
        start..self.points.len()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point3> {
        self.points.get(index)
    }

    /// `[minx, miny, minz, maxx, maxy, maxz]`, or `None` for an empty pool
    pub fn extent(&self) -> Option<[f64; 6]> {
        let first = self.points.first()?;
        let init = [first.0, first.1, first.2, first.0, first.1, first.2];

        Some(self.points.iter().fold(init, |mut e, p| {
            e[0] = e[0].min(p.0);
            e[1] = e[1].min(p.1);
            e[2] = e[2].min(p.2);
            e[3] = e[3].max(p.0);
            e[4] = e[4].max(p.1);
            e[5] = e[5].max(p.2);
            e
        }))
    }
}
