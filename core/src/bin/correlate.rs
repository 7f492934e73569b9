//! Entry point for the standalone correlation pass.

use clap::Parser;
use listenomics_core::analysis::{correlation, render_summary};
use listenomics_core::pipeline::driver;
use std::path::PathBuf;
use std::process;
use tracing::error;

/// Rank genres by how strongly their year-over-year popularity changes
/// track unemployment rate changes.
#[derive(Parser, Debug)]
#[command(name = "listenomics-correlate", version)]
struct Args {
    /// Path to the enriched trend table (year\tgenre\tcount\trate)
    input: PathBuf,

    /// Output file for the ranked correlation table
    output: PathBuf,

    /// Number of genres shown in the console summary
    #[arg(long, default_value_t = correlation::SUMMARY_TOP_N)]
    top: usize,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match driver::run_correlation(&args.input, &args.output) {
        Ok(results) => {
            print!("{}", render_summary(&results, args.top));
        }
        Err(e) => {
            error!("correlation analysis failed: {e}");
            process::exit(1);
        }
    }
}
