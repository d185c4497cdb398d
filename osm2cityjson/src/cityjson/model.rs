use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::vertices::VertexPool;
use crate::collect::global_variables::{CITYJSON_TYPE, CITYJSON_VERSION};
use crate::geo_core::GeoCore;

/// CityJSON document: city objects plus the vertex pool they index into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Keyed by feature identifier; sorted so the output is deterministic
    #[serde(rename = "CityObjects")]
    pub city_objects: BTreeMap<String, CityObject>,
    pub vertices: VertexPool,
}

impl CityModel {
    pub fn new() -> Self {
        CityModel {
            kind: CITYJSON_TYPE.to_string(),
            version: CITYJSON_VERSION.to_string(),
            metadata: None,
            city_objects: BTreeMap::new(),
            vertices: VertexPool::new(),
        }
    }

    /// Insert a city object, returning the one it replaced (last write wins)
    pub fn insert(&mut self, id: impl Into<String>, object: CityObject) -> Option<CityObject> {
        self.city_objects.insert(id.into(), object)
    }

    pub fn get(&self, id: &str) -> Option<&CityObject> {
        self.city_objects.get(id)
    }

    pub fn len(&self) -> usize {
        self.city_objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.city_objects.is_empty()
    }

    /// Fill `metadata` with the target CRS and the extent of the vertices
    pub fn update_metadata(&mut self, geo_core: &GeoCore) {
        self.metadata = Some(Metadata {
            reference_system: geo_core.reference_system_urn(),
            geographical_extent: self.vertices.extent(),
        });
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn write_to<W: Write>(&self, writer: W, pretty: bool) -> serde_json::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)
        } else {
            serde_json::to_writer(writer, self)
        }
    }

    /// Save to a CityJSON file
    pub fn save(&self, path: &Path, pretty: bool) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CityJSON file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, pretty)
            .with_context(|| format!("Failed to write CityJSON file: {:?}", path))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush CityJSON file: {:?}", path))?;
        Ok(())
    }
}

impl Default for CityModel {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub reference_system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographical_extent: Option<[f64; 6]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CityObjectType {
    Road,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityObject {
    #[serde(rename = "type")]
    pub kind: CityObjectType,
    pub attributes: RoadAttributes,
    pub geometry: Vec<Geometry>,
}

impl CityObject {
    pub fn road(attributes: RoadAttributes, geometry: Vec<Geometry>) -> Self {
        CityObject {
            kind: CityObjectType::Road,
            attributes,
            geometry,
        }
    }

    /// Geometry with the given LoD label
    pub fn geometry_for_lod(&self, lod: &str) -> Option<&Geometry> {
        self.geometry.iter().find(|g| g.lod() == lod)
    }

    /// Every vertex index referenced by this object, in boundary order
    pub fn vertex_indices(&self) -> Vec<usize> {
        self.geometry.iter().flat_map(Geometry::indices).collect()
    }
}

/// Attributes carried over from the OSM feature; `name` is written as null when unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadAttributes {
    pub osm_id: String,
    pub road_type: String,
    pub name: Option<String>,
}

/// Geometry representation; boundaries hold indices into the vertex pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    MultiLineString {
        lod: String,
        boundaries: Vec<Vec<usize>>,
    },
    MultiSurface {
        lod: String,
        boundaries: Vec<Vec<Vec<usize>>>,
    },
}

impl Geometry {
    pub fn lod(&self) -> &str {
        match self {
            Geometry::MultiLineString { lod, .. } | Geometry::MultiSurface { lod, .. } => lod,
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        match self {
            Geometry::MultiLineString { boundaries, .. } => {
                boundaries.iter().flatten().copied().collect()
            }
            Geometry::MultiSurface { boundaries, .. } => {
                boundaries.iter().flatten().flatten().copied().collect()
            }
        }
    }
}
