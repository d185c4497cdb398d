use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning road features into a city model
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input could not be opened or parsed; nothing was processed
    #[error("failed to open source {path:?}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },

    /// A coordinate could not be reprojected into the target CRS
    #[error("reprojection failed: {0}")]
    Projection(String),

    /// The buffer engine failed or produced a degenerate outline
    #[error("buffer computation failed: {0}")]
    BufferComputation(String),

    /// Geometry that is not a usable simple line string
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// No output destination was supplied
    #[error("no output file given")]
    MissingOutputTarget,

    /// A per-feature failure, tagged with the feature's identifier
    #[error("failed to process feature {osm_id:?}")]
    Feature {
        osm_id: String,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Tag this error with the identifier of the feature being processed
    pub fn for_feature(self, osm_id: &str) -> Self {
        match self {
            ConvertError::Feature { .. } => self,
            other => ConvertError::Feature {
                osm_id: osm_id.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, without the per-feature wrapper
    pub fn root(&self) -> &ConvertError {
        match self {
            ConvertError::Feature { source, .. } => source.root(),
            other => other,
        }
    }

    /// Identifier of the failing feature, if known
    pub fn osm_id(&self) -> Option<&str> {
        match self {
            ConvertError::Feature { osm_id, .. } => Some(osm_id),
            _ => None,
        }
    }
}
