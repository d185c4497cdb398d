use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;

#[cfg(feature = "indicatif")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::cityjson::{BuildOutcome, CityModel, CityObjectBuilder};
use crate::collect::global_variables::{
    DEFAULT_BUFFER_DISTANCE, DEFAULT_LAYER, DEFAULT_QUADRANT_SEGMENTS, DEFAULT_SOURCE_EPSG,
    DEFAULT_TARGET_EPSG,
};
use crate::collect::read_features;
use crate::error::ConvertError;
use crate::geo_core::{BoundingBox, CoordinateTransformer, GeoCore};
use crate::geometric::buffer::{check_distance, GeometryBufferer, GeosBufferer};
use crate::geometric::road::RoadFeature;

#[cfg(feature = "indicatif")]
fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Progress bar over features; a spinner when the count is unknown
struct Progress {
    #[cfg(feature = "indicatif")]
    bar: Option<ProgressBar>,
}

impl Progress {
    fn new(enabled: bool, len: Option<u64>) -> Self {
        #[cfg(feature = "indicatif")]
        {
            let bar = enabled.then(|| {
                let pb = match len {
                    Some(len) => {
                        let pb = ProgressBar::new(len);
                        pb.set_style(progress_style());
                        pb
                    }
                    None => ProgressBar::new_spinner(),
                };
                pb.set_message("Features");
                pb
            });
            Progress { bar }
        }

        #[cfg(not(feature = "indicatif"))]
        {
            let _ = (enabled, len);
            Progress {}
        }
    }

    fn inc(&self) {
        #[cfg(feature = "indicatif")]
        if let Some(ref pb) = self.bar {
            pb.inc(1);
        }
    }

    fn finish(&self, aborted: bool) {
        #[cfg(feature = "indicatif")]
        if let Some(ref pb) = self.bar {
            if aborted {
                pb.abandon_with_message("Aborted");
            } else {
                pb.finish_with_message("Done");
            }
        }
        #[cfg(not(feature = "indicatif"))]
        let _ = aborted;
    }
}

/// What to do when a single feature cannot be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the run and return the error
    #[default]
    Abort,
    /// Log the error, count it and continue with the next feature
    Skip,
}

/// Settings of a conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub source_epsg: u32,
    pub target_epsg: u32,
    /// Footprint half-width, in target CRS units
    pub buffer_distance: f64,
    pub quadrant_segments: i32,
    /// GDAL layer to read
    pub layer_name: String,
    /// Only keep features crossing this box (source CRS)
    pub bbox: Option<BoundingBox>,
    pub error_policy: ErrorPolicy,
    /// Write `metadata` (reference system, extent)
    pub with_metadata: bool,
    pub pretty: bool,
    pub show_progress: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            source_epsg: DEFAULT_SOURCE_EPSG,
            target_epsg: DEFAULT_TARGET_EPSG,
            buffer_distance: DEFAULT_BUFFER_DISTANCE,
            quadrant_segments: DEFAULT_QUADRANT_SEGMENTS,
            layer_name: DEFAULT_LAYER.to_string(),
            bbox: None,
            error_policy: ErrorPolicy::Abort,
            with_metadata: true,
            pretty: false,
            show_progress: false,
        }
    }
}

impl ConvertOptions {
    /// Reject settings that would make every feature fail
    pub fn validate(&self) -> Result<(), ConvertError> {
        check_distance(self.buffer_distance)?;
        if self.quadrant_segments < 1 {
            return Err(ConvertError::BufferComputation(format!(
                "quadrant segments must be at least 1, got {}",
                self.quadrant_segments
            )));
        }
        Ok(())
    }
}

/// Counters of a conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub features_read: usize,
    pub roads_converted: usize,
    pub skipped_not_road: usize,
    pub skipped_outside_bbox: usize,
    pub failed: usize,
    /// Converted roads whose identifier replaced an earlier object
    pub overwritten: usize,
}

/// Osm2CityJson structure
/// Drives a conversion: reads features, keeps the roads, builds their city objects
/// and writes the resulting CityJSON model
pub struct Osm2CityJson {
    options: ConvertOptions,
    /// GeoCore for CRS handling
    pub geo_core: GeoCore,
    builder: CityObjectBuilder,
    model: CityModel,
    summary: ConversionSummary,
}

impl Osm2CityJson {
    /// Create a new Osm2CityJson using PROJ and GEOS
    pub fn new(options: ConvertOptions) -> Result<Self, ConvertError> {
        options.validate()?;
        let geo_core = GeoCore::new(options.source_epsg, options.target_epsg);
        let transformer = geo_core.transformer()?;
        let bufferer = GeosBufferer::new(options.quadrant_segments);

        Self::with_engines(options, Box::new(transformer), Box::new(bufferer))
    }

    /// Create a new Osm2CityJson with custom reprojection and buffer engines
    pub fn with_engines(
        options: ConvertOptions,
        transformer: Box<dyn CoordinateTransformer>,
        bufferer: Box<dyn GeometryBufferer>,
    ) -> Result<Self, ConvertError> {
        options.validate()?;
        let geo_core = GeoCore::new(options.source_epsg, options.target_epsg);
        let builder = CityObjectBuilder::new(transformer, bufferer, options.buffer_distance);

        Ok(Osm2CityJson {
            options,
            geo_core,
            builder,
            model: CityModel::new(),
            summary: ConversionSummary::default(),
        })
    }

    /// Read features from `input` and process them as they are read
    pub fn run(&mut self, input: &Path) -> Result<ConversionSummary> {
        info!("Reading features from {:?}", input);
        let layer_name = self.options.layer_name.clone();
        let progress = Progress::new(self.options.show_progress, None);

        let result = read_features(input, &layer_name, |feature| {
            let result = self.handle_feature(&feature);
            progress.inc();
            result
        });
        progress.finish(result.is_err());
        result.with_context(|| format!("Failed to convert {:?}", input))?;

        self.log_summary();
        Ok(self.summary)
    }

    /// Process features in the order given.
    ///
    /// With [`ErrorPolicy::Abort`] the first failing feature ends the run;
    /// the objects built before it stay in the model.
    pub fn process<I>(&mut self, features: I) -> Result<ConversionSummary, ConvertError>
    where
        I: IntoIterator<Item = RoadFeature>,
    {
        let features = features.into_iter();
        let progress = Progress::new(
            self.options.show_progress,
            Some(features.size_hint().0 as u64),
        );

        for feature in features {
            let result = self.handle_feature(&feature);
            progress.inc();
            if let Err(e) = result {
                progress.finish(true);
                return Err(e);
            }
        }
        progress.finish(false);

        self.log_summary();
        Ok(self.summary)
    }

    /// Process one feature under the error policy
    fn handle_feature(&mut self, feature: &RoadFeature) -> Result<(), ConvertError> {
        match self.process_feature(feature) {
            Err(e) if self.options.error_policy == ErrorPolicy::Skip => {
                warn!("{}: {}", e, e.root());
                Ok(())
            }
            result => result,
        }
    }

    fn log_summary(&self) {
        let s = &self.summary;
        info!(
            "{} features read, {} roads converted, {} not roads, {} outside bbox, {} failed, {} overwritten",
            s.features_read,
            s.roads_converted,
            s.skipped_not_road,
            s.skipped_outside_bbox,
            s.failed,
            s.overwritten
        );
    }

    /// Classify one feature and, if it is a road, add it to the model
    pub fn process_feature(&mut self, feature: &RoadFeature) -> Result<(), ConvertError> {
        self.summary.features_read += 1;

        if !feature.is_road() {
            debug!(
                "Skipping {:?}: highway {:?} is not a road type",
                feature.osm_id, feature.highway
            );
            self.summary.skipped_not_road += 1;
            return Ok(());
        }

        if let Some(bbox) = self.options.bbox {
            if !bbox.intersects_line(&feature.geometry) {
                self.summary.skipped_outside_bbox += 1;
                return Ok(());
            }
        }

        match self.builder.build(feature, &mut self.model) {
            Ok(outcome) => {
                self.summary.roads_converted += 1;
                if outcome == BuildOutcome::Replaced {
                    debug!("{:?} replaces an earlier city object", feature.osm_id);
                    self.summary.overwritten += 1;
                }
                Ok(())
            }
            Err(e) => {
                self.summary.failed += 1;
                Err(e)
            }
        }
    }

    pub fn summary(&self) -> ConversionSummary {
        self.summary
    }

    pub fn model(&self) -> &CityModel {
        &self.model
    }

    /// Write metadata if enabled; call once all features are processed
    pub fn finalize(&mut self) {
        if self.options.with_metadata {
            self.model.update_metadata(&self.geo_core);
        } else {
            self.model.metadata = None;
        }
    }

    /// Finalize and hand over the model
    pub fn into_model(mut self) -> CityModel {
        self.finalize();
        self.model
    }

    /// Finalize and save the model to a CityJSON file
    pub fn to_cityjson(&mut self, output: &Path) -> Result<()> {
        self.finalize();
        self.model.save(output, self.options.pretty)?;

        info!(
            "CityJSON saved to: {:?} ({} city objects, {} vertices)",
            output,
            self.model.len(),
            self.model.vertices.len()
        );
        Ok(())
    }
}
