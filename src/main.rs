//! CLI entry point for the trip builder.
//!
//! Reads a CSV of device fixes, writes rejected rows to a log, and writes the
//! reconstructed trips as a GeoJSON FeatureCollection.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use trip_builder::config::{RunConfig, parse_threshold};
use trip_builder::logging;
use trip_builder::pipeline::run_files;
use trip_builder::trips::SplitRule;
use trip_builder::trips::segment::{DEFAULT_MAX_GAP_MIN, DEFAULT_MAX_JUMP_KM};

#[derive(Parser)]
#[command(name = "trip_builder")]
#[command(about = "Segment GPS fixes into per-device trips and export them as GeoJSON", long_about = None)]
struct Cli {
    /// CSV file with device_id,lat,lon,timestamp rows
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// GeoJSON file to write trips to
    #[arg(short, long, default_value = "trips.geojson")]
    output: PathBuf,

    /// CSV file to log rejected rows to
    #[arg(short, long, default_value = "rejects.csv")]
    rejects: PathBuf,

    /// Split a trip when consecutive fixes are more than this many minutes apart
    #[arg(long, default_value_t = DEFAULT_MAX_GAP_MIN, value_parser = parse_threshold)]
    max_gap_min: f64,

    /// Split a trip when consecutive fixes are more than this many km apart
    #[arg(long, default_value_t = DEFAULT_MAX_JUMP_KM, value_parser = parse_threshold)]
    max_jump_km: f64,

    /// Optional: write run statistics as JSON to this path
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| logging::DEFAULT_LOG_FILE_PATH.to_string());
    let _file_guard = logging::init(Path::new(&log_file_path))?;

    let config = RunConfig::new(cli.input)
        .with_output(cli.output)
        .with_rejects(cli.rejects)
        .with_stats(cli.stats)
        .with_rule(SplitRule {
            max_gap_min: cli.max_gap_min,
            max_jump_km: cli.max_jump_km,
        });

    let stats = run_files(&config)?;

    println!(
        "Exported {} trips; rejects logged to {}",
        stats.trips_exported,
        config.rejects.display()
    );

    Ok(())
}
