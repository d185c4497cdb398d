use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;
use std::path::PathBuf;

use osm2cityjson::collect::global_variables::{
    DEFAULT_BUFFER_DISTANCE, DEFAULT_LAYER, DEFAULT_QUADRANT_SEGMENTS, DEFAULT_SOURCE_EPSG,
    DEFAULT_TARGET_EPSG,
};
use osm2cityjson::geo_core::BoundingBox;
use osm2cityjson::{ConvertError, ConvertOptions, ErrorPolicy, Osm2CityJson};

/// Convert OpenStreetMap roads to CityJSON (LoD 0.1 centerlines, LoD 1 footprints)
#[derive(Parser, Debug)]
#[command(name = "osm2cityjson", version)]
struct Args {
    /// Input file: .osm / .pbf (read through GDAL) or .geojson
    input: Option<PathBuf>,

    /// Output CityJSON file
    output: Option<PathBuf>,

    /// EPSG code of the input coordinates
    #[arg(long, default_value_t = DEFAULT_SOURCE_EPSG)]
    source_epsg: u32,

    /// EPSG code of the output coordinates (must be planar)
    #[arg(long, default_value_t = DEFAULT_TARGET_EPSG)]
    target_epsg: u32,

    /// Road footprint half-width, in target CRS units
    #[arg(long, default_value_t = DEFAULT_BUFFER_DISTANCE)]
    buffer_distance: f64,

    /// Segments per quarter circle for rounded buffer ends
    #[arg(long, default_value_t = DEFAULT_QUADRANT_SEGMENTS)]
    quadrant_segments: i32,

    /// GDAL layer holding the road lines
    #[arg(long, default_value = DEFAULT_LAYER)]
    layer: String,

    /// Only convert roads crossing min_x,min_y,max_x,max_y (input CRS)
    #[arg(long, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Skip features that fail to convert instead of stopping
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,

    /// Indent the output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Do not write the metadata block
    #[arg(long, default_value_t = false)]
    no_metadata: bool,
}

impl Args {
    /// Input and output paths, both required
    fn paths(&self) -> Result<(PathBuf, PathBuf), ConvertError> {
        match (&self.input, &self.output) {
            (Some(input), Some(output)) => Ok((input.clone(), output.clone())),
            _ => Err(ConvertError::MissingOutputTarget),
        }
    }

    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            source_epsg: self.source_epsg,
            target_epsg: self.target_epsg,
            buffer_distance: self.buffer_distance,
            quadrant_segments: self.quadrant_segments,
            layer_name: self.layer.clone(),
            bbox: self.bbox,
            error_policy: if self.skip_invalid {
                ErrorPolicy::Skip
            } else {
                ErrorPolicy::Abort
            },
            with_metadata: !self.no_metadata,
            pretty: self.pretty,
            show_progress: true,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let (input, output) = match args.paths() {
        Ok(paths) => paths,
        Err(_) => {
            println!("Please provide an input and output file.");
            println!("{}", Args::command().render_usage());
            return Ok(());
        }
    };

    let mut converter = Osm2CityJson::new(args.options())?;
    converter.run(&input)?;
    converter.to_cityjson(&output)?;

    let summary = converter.summary();
    info!(
        "{} roads written to {:?} ({} failed)",
        summary.roads_converted, output, summary.failed
    );

    Ok(())
}
