//! Command-line interface for garment_scan
//!
//! Extracts wardrobe features from one photograph and prints them as JSON

use garment_scan::image_loader::{is_supported_extension, load_image};
use garment_scan::{FeaturePipeline, FeatureRecord, InMemoryFeatureStore, PipelineConfig};
use std::{env, path::Path, process};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut owner_id = String::from("local");
    let mut image_url = None;
    let mut image_path_arg = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "--owner" | "--url" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires a value", args[i]);
                    process::exit(1);
                };
                match args[i].as_str() {
                    "--config" => config_path = Some(value.clone()),
                    "--owner" => owner_id = value.clone(),
                    _ => image_url = Some(value.clone()),
                }
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(image_path_str) = image_path_arg else {
        print_help(&args[0]);
        process::exit(1);
    };
    let image_path = Path::new(&image_path_str);

    let supported = image_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_supported_extension);
    if !supported {
        eprintln!("Error: '{}' is not a JPEG or PNG file", image_path.display());
        process::exit(1);
    }

    let config = match config_path {
        Some(path) => PipelineConfig::from_json_file(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }),
        None => PipelineConfig::default(),
    };

    let pipeline = FeaturePipeline::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Invalid config: {}", e.user_message());
        process::exit(1);
    });

    let image = load_image(image_path).unwrap_or_else(|e| {
        eprintln!("Loading failed: {}", e);
        eprintln!("{}", e.user_message());
        process::exit(1);
    });

    let image_url = image_url.unwrap_or_else(|| format!("file://{}", image_path.display()));
    let store = InMemoryFeatureStore::new();

    match pipeline.process(&image, &image_url, &owner_id, Some(&store)) {
        Ok(record) => print_record(&record),
        Err(error) => {
            eprintln!("Extraction failed: {}", error);
            eprintln!("{}", error.user_message());
            process::exit(1);
        }
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Extract dominant color, garment region, garment type and tags from a photo.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE    Pipeline configuration (JSON, see generate_config)");
    eprintln!("  --owner ID       Wardrobe owner id (default: local)");
    eprintln!("  --url URL        Public image URL stored in the record");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG=debug to see per-stage timings.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} shirt.jpg", program_name);
    eprintln!("  {} --owner u1 --url https://cdn.example.com/u1/shirt.jpg shirt.jpg", program_name);
}

fn print_record(record: &FeatureRecord) {
    // JSON to stdout for programmatic use
    match serde_json::to_string_pretty(record) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing record: {}", e);
            process::exit(1);
        }
    }

    // Summary to stderr for human reading
    let palette: Vec<String> = record.palette.iter().map(|c| c.to_hex()).collect();
    let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
    let bbox = record.bounding_box;

    eprintln!();
    eprintln!("Garment Summary:");
    eprintln!("  Type: {}", record.clothing_type);
    eprintln!("  Dominant color: {}", record.dominant_color.to_hex());
    eprintln!("  Palette: {}", palette.join(", "));
    eprintln!("  Region: {}x{} at ({}, {})", bbox.width, bbox.height, bbox.x, bbox.y);
    eprintln!("  Tags: {}", if tags.is_empty() { "-".to_string() } else { tags.join(", ") });

    if bbox.is_empty() {
        eprintln!("  Warning: No garment region found. Try a plain, light background.");
    }
}
