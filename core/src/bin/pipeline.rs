//! Entry point for the full three-stage pipeline.

use clap::Parser;
use listenomics_common::PipelineConfig;
use listenomics_core::pipeline::driver;
use std::path::PathBuf;
use std::process;
use tracing::error;

/// Fuse track years, genre annotations and unemployment rates into the
/// enriched trend table.
#[derive(Parser, Debug)]
#[command(name = "listenomics-pipeline", version)]
struct Args {
    /// Path to the track-year dataset (YEAR<SEP>TRACKID<SEP>...)
    track_year_input: PathBuf,

    /// Path to the genre annotations (TRACKID\tGENRE)
    genre_input: PathBuf,

    /// Path to the unemployment reference data (year,m1,...,m12 CSV)
    unemployment_input: PathBuf,

    /// Output directory for intermediate and final tables
    output_dir: PathBuf,

    /// Number of shuffle partitions (defaults to the number of CPUs)
    #[arg(long)]
    partitions: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = PipelineConfig::default();
    if let Some(partitions) = args.partitions {
        config = config.with_num_partitions(partitions);
    }

    match driver::run_pipeline(
        &config,
        &args.track_year_input,
        &args.genre_input,
        &args.unemployment_input,
        &args.output_dir,
    ) {
        Ok(final_path) => {
            println!("Enriched trend table written to {}", final_path.display());
        }
        Err(e) => {
            error!("pipeline failed: {e}");
            process::exit(1);
        }
    }
}
