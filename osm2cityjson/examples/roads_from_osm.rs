use anyhow::Result;
use osm2cityjson::{ConvertOptions, ErrorPolicy, Osm2CityJson};
use std::path::Path;

/// Example: Converting the roads of an OSM extract to CityJSON
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Example: Roads from an OSM extract ===\n");

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../data/Breda/Breda extract.osm".to_string());
    let output = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "./output/breda_roads.city.json".to_string());

    // Keep going on broken features, write indented JSON
    let options = ConvertOptions {
        error_policy: ErrorPolicy::Skip,
        pretty: true,
        show_progress: true,
        ..ConvertOptions::default()
    };

    println!("Settings:");
    println!("  - Source CRS: EPSG:{}", options.source_epsg);
    println!("  - Target CRS: EPSG:{}", options.target_epsg);
    println!("  - Buffer distance: {} m\n", options.buffer_distance);

    let mut converter = Osm2CityJson::new(options)?;
    let summary = converter.run(Path::new(&input))?;

    println!("\nRoads processed successfully!");
    println!("  - Features read: {}", summary.features_read);
    println!("  - Roads converted: {}", summary.roads_converted);
    println!("  - Not roads: {}", summary.skipped_not_road);
    println!("  - Failed: {}", summary.failed);

    if let Some(parent) = Path::new(&output).parent() {
        std::fs::create_dir_all(parent)?;
    }
    converter.to_cityjson(Path::new(&output))?;

    println!("\nProcessing complete!");
    println!("  - Output file: {:?}", output);
    println!("  - Vertices: {}", converter.model().vertices.len());

    Ok(())
}
