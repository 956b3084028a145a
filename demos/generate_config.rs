//! Generate the default pipeline configuration file
//!
//! Creates a JSON config with all default parameters and the built-in tag rules

use garment_scan::PipelineConfig;
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_config.json>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} config/pipeline.json", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);

    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let config = PipelineConfig::default();

    match config.to_json_file(output_path) {
        Ok(()) => {
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!(
                "  Clustering: {} colors, seed {}, at most {} iterations",
                config.clustering.palette_size, config.clustering.seed, config.clustering.max_iterations
            );
            eprintln!(
                "  Region detection: {} foreground, min area {:.0}",
                if config.region_detection.dark_foreground { "dark" } else { "light" },
                config.region_detection.min_contour_area
            );
            eprintln!(
                "  Classification: shirt < {:.2} <= pants < {:.2} <= full_body",
                config.classification.shirt_max_ratio, config.classification.pants_max_ratio
            );
            eprintln!("  Tagging: {} rules", config.tagging.rules.len());
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e);
            process::exit(1);
        }
    }
}
