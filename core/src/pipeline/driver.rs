//! Pipeline orchestration.
//!
//! Runs the three stages in sequence with a strict barrier between them:
//! every stage writes its full output through the storage layer before the
//! next stage reads it back. Output locations are cleared up front so
//! reruns are idempotent. A stage failure aborts the run with an error
//! naming the stage.

use crate::analysis::{CorrelationResult, correlate, render_results_table};
use crate::broadcast::BroadcastVariable;
use crate::pipeline::{GenreYearAggregator, TrackGenreJoin, UnemploymentBroadcastJoin};
use crate::records::{
    self, EnrichedRecord, GenreYearCount, TrackGenreFact, TrackYearFact, YearGenre,
};
use crate::storage;
use crate::unemployment::UnemploymentTable;
use listenomics_common::{Error, PipelineConfig, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stage 1 output, relative to the pipeline output directory.
pub const STAGE1_OUTPUT: &str = "intermediate/stage1_joined.tsv";
/// Stage 2 output, relative to the pipeline output directory.
pub const STAGE2_OUTPUT: &str = "intermediate/stage2_counts.tsv";
/// Stage 3 output (the enriched trend table), relative to the pipeline
/// output directory.
pub const FINAL_OUTPUT: &str = "final/enriched.tsv";

/// Run stages 1-3 and return the path of the enriched trend table.
pub fn run_pipeline(
    config: &PipelineConfig,
    track_year_input: &Path,
    genre_input: &Path,
    unemployment_input: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    // clear previous outputs so a rerun cannot mix runs
    storage::remove_dir_if_exists(output_dir.join("intermediate"))?;
    storage::remove_dir_if_exists(output_dir.join("final"))?;

    info!(
        "loading unemployment reference table from {}",
        unemployment_input.display()
    );
    let table = UnemploymentTable::load(unemployment_input)?;
    if table.is_empty() {
        return Err(Error::configuration_error(format!(
            "no usable reference rows in {}",
            unemployment_input.display()
        )));
    }
    info!(years = table.len(), "unemployment table loaded");

    info!("stage 1: joining track years with genre annotations");
    let stage1_path = output_dir.join(STAGE1_OUTPUT);
    let joined = run_stage1(config, track_year_input, genre_input, &stage1_path)
        .map_err(|e| stage_failure("stage 1", e))?;
    info!(rows = joined, "stage 1 complete");

    info!("stage 2: counting observations per (year, genre)");
    let stage2_path = output_dir.join(STAGE2_OUTPUT);
    let counted = run_stage2(config, &stage1_path, &stage2_path)
        .map_err(|e| stage_failure("stage 2", e))?;
    info!(rows = counted, "stage 2 complete");

    info!("stage 3: joining counts with unemployment rates");
    let final_path = output_dir.join(FINAL_OUTPUT);
    let enriched = run_stage3(config, table, &stage2_path, &final_path)
        .map_err(|e| stage_failure("stage 3", e))?;
    info!(
        rows = enriched,
        "stage 3 complete; enriched table at {}",
        final_path.display()
    );

    Ok(final_path)
}

/// Run the standalone correlation pass over a Stage-3-format table and
/// write the ranked results file. Returns the ranked results for rendering.
pub fn run_correlation(input: &Path, output: &Path) -> Result<Vec<CorrelationResult>> {
    let lines = storage::read_lines(input)?;
    let enriched: Vec<EnrichedRecord> = lines
        .iter()
        .filter_map(|line| records::parse_enriched(line))
        .collect();
    log_drops("enriched table", lines.len(), enriched.len());
    info!(
        records = enriched.len(),
        "loaded enriched records from {}",
        input.display()
    );

    let results = correlate(enriched)?;
    storage::overwrite_string(output, &render_results_table(&results))?;
    info!(
        genres = results.len(),
        "correlation results written to {}",
        output.display()
    );

    Ok(results)
}

fn run_stage1(
    config: &PipelineConfig,
    track_year_input: &Path,
    genre_input: &Path,
    output: &Path,
) -> Result<usize> {
    let year_lines = storage::read_lines(track_year_input)?;
    let years: Vec<TrackYearFact> = year_lines
        .iter()
        .filter_map(|line| {
            records::parse_track_year(line, &config.track_delimiter, config.earliest_year)
        })
        .collect();
    log_drops("track-year source", year_lines.len(), years.len());

    let genre_lines = storage::read_lines(genre_input)?;
    let genres: Vec<TrackGenreFact> = genre_lines
        .iter()
        .filter_map(|line| records::parse_track_genre(line))
        .collect();
    log_drops("genre source", genre_lines.len(), genres.len());

    let joined = TrackGenreJoin::new(config.num_partitions).run(years, genres)?;
    storage::overwrite_lines(output, joined.iter().map(YearGenre::to_tsv))?;
    Ok(joined.len())
}

fn run_stage2(config: &PipelineConfig, input: &Path, output: &Path) -> Result<usize> {
    let lines = storage::read_lines(input)?;
    let rows: Vec<YearGenre> = lines
        .iter()
        .filter_map(|line| records::parse_year_genre(line))
        .collect();
    log_drops("stage 1 output", lines.len(), rows.len());

    let counts = GenreYearAggregator::new(config.num_partitions).run(rows)?;
    storage::overwrite_lines(output, counts.iter().map(GenreYearCount::to_tsv))?;
    Ok(counts.len())
}

fn run_stage3(
    config: &PipelineConfig,
    table: UnemploymentTable,
    input: &Path,
    output: &Path,
) -> Result<usize> {
    let lines = storage::read_lines(input)?;
    let rows: Vec<GenreYearCount> = lines
        .iter()
        .filter_map(|line| records::parse_genre_year_count(line))
        .collect();
    log_drops("stage 2 output", lines.len(), rows.len());

    let join = UnemploymentBroadcastJoin::new(BroadcastVariable::new(table), config.num_partitions);
    let enriched = join.run(rows)?;
    storage::overwrite_lines(output, enriched.iter().map(EnrichedRecord::to_tsv))?;
    Ok(enriched.len())
}

fn stage_failure(stage: &str, error: Error) -> Error {
    Error::computation_error_with_source(format!("{stage} failed"), error)
}

fn log_drops(source: &str, total: usize, kept: usize) {
    if kept < total {
        debug!(source, dropped = total - kept, "dropped malformed lines");
    }
}
