//! Correlation engine: does a genre's popularity track the unemployment rate?
//!
//! Groups the enriched table by genre, computes year-over-year deltas of
//! the rate and the observation count over the year-sorted series, and
//! measures their linear association with the Pearson coefficient. Results
//! are ranked by descending |r| so the strongest relationships, positive or
//! negative, surface first.

use crate::records::EnrichedRecord;
use listenomics_common::{Error, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt::Write;

/// Genres shown in the rendered summary.
pub const SUMMARY_TOP_N: usize = 10;

/// Correlation outcome for one genre.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    pub genre: String,
    /// Pearson coefficient over the delta pairs, in [-1, 1]; 0 when either
    /// delta series has no variance.
    pub r: f64,
    /// Number of delta pairs the coefficient was computed from.
    pub data_points: usize,
    pub mean_rate_delta: f64,
    pub mean_count_delta: f64,
}

/// Qualitative strength band of a coefficient. The bands partition the
/// whole real line: every r falls in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationBand {
    StrongPositive,
    WeakPositive,
    Negligible,
    WeakNegative,
    StrongNegative,
}

impl CorrelationBand {
    pub fn of(r: f64) -> Self {
        if r > 0.5 {
            Self::StrongPositive
        } else if r > 0.2 {
            Self::WeakPositive
        } else if r < -0.5 {
            Self::StrongNegative
        } else if r < -0.2 {
            Self::WeakNegative
        } else {
            Self::Negligible
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongPositive => "(strong positive)",
            Self::WeakPositive => "(weak positive)",
            Self::Negligible => "(negligible)",
            Self::WeakNegative => "(weak negative)",
            Self::StrongNegative => "(strong negative)",
        }
    }
}

/// Correlate year-over-year rate deltas with count deltas per genre.
///
/// Genres with fewer than three distinct years produce fewer than two
/// deltas and are excluded. A duplicate year within a genre is a
/// data-quality violation and fails the run; the enriched table is keyed by
/// (year, genre), so duplicates can only come from corrupted input.
pub fn correlate(records: Vec<EnrichedRecord>) -> Result<Vec<CorrelationResult>> {
    let mut by_genre: HashMap<String, Vec<EnrichedRecord>> = HashMap::new();
    for record in records {
        by_genre.entry(record.genre.clone()).or_default().push(record);
    }

    // genres are disjoint key groups: correlate them in parallel
    let mut results: Vec<CorrelationResult> = by_genre
        .into_par_iter()
        .map(|(genre, series)| correlate_genre(genre, series))
        .collect::<Result<Vec<Option<CorrelationResult>>>>()?
        .into_iter()
        .flatten()
        .collect();

    // Strongest relationships first; genre name breaks exact ties so the
    // ranking is reproducible.
    results.sort_by(|a, b| {
        b.r.abs()
            .total_cmp(&a.r.abs())
            .then_with(|| a.genre.cmp(&b.genre))
    });

    Ok(results)
}

// One genre's series -> its correlation result, or None when fewer than
// two deltas survive.
fn correlate_genre(
    genre: String,
    mut series: Vec<EnrichedRecord>,
) -> Result<Option<CorrelationResult>> {
    series.sort_by_key(|record| record.year);
    if let Some(window) = series.windows(2).find(|w| w[0].year == w[1].year) {
        return Err(Error::data_quality_error(format!(
            "duplicate year {} for genre '{}'",
            window[0].year, genre
        )));
    }

    if series.len() < 3 {
        return Ok(None);
    }

    let rate_deltas: Vec<f64> = series.windows(2).map(|w| w[1].rate - w[0].rate).collect();
    let count_deltas: Vec<f64> = series
        .windows(2)
        .map(|w| w[1].count as f64 - w[0].count as f64)
        .collect();

    Ok(Some(CorrelationResult {
        genre,
        r: pearson(&rate_deltas, &count_deltas),
        data_points: rate_deltas.len(),
        mean_rate_delta: mean(&rate_deltas),
        mean_count_delta: mean(&count_deltas),
    }))
}

/// Pearson correlation coefficient over two equal-length series, in the
/// sum-based form. A zero denominator (no variance in either series) is
/// defined as 0 rather than NaN.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n == 0 || n != y.len() {
        return 0.0;
    }

    let n = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&xi, &yi) in x.iter().zip(y) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_x2 += xi * xi;
        sum_y2 += yi * yi;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Render the ranked results as the final tab-separated table.
pub fn render_results_table(results: &[CorrelationResult]) -> String {
    let mut out = String::from(
        "Genre\tPearson_Correlation\tData_Points\tAvg_Unemployment_Delta\tAvg_Count_Delta\n",
    );
    for result in results {
        let _ = writeln!(
            out,
            "{}\t{:.4}\t{}\t{:.4}\t{:.2}",
            result.genre,
            result.r,
            result.data_points,
            result.mean_rate_delta,
            result.mean_count_delta
        );
    }
    out
}

/// Render the human-readable top-N summary with qualitative bands.
pub fn render_summary(results: &[CorrelationResult], top_n: usize) -> String {
    let mut out = String::from("\n=== Correlation Analysis Summary ===\n\n");

    if results.is_empty() {
        out.push_str("No results to display.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "Top {} Strongest Correlations (by absolute value):",
        top_n
    );
    let _ = writeln!(out, "{:<20} {:>12} {:>12}", "Genre", "Correlation", "Data Points");
    let _ = writeln!(out, "{}", "-".repeat(50));

    for result in results.iter().take(top_n) {
        let _ = writeln!(
            out,
            "{:<20} {:>12.4} {:>12} {}",
            result.genre,
            result.r,
            result.data_points,
            CorrelationBand::of(result.r).label()
        );
    }

    out.push_str("\nInterpretation:\n");
    out.push_str("- Positive correlation: genre count increases when unemployment increases\n");
    out.push_str("- Negative correlation: genre count decreases when unemployment increases\n");
    out.push_str(
        "- Correlation near 0: no linear relationship between unemployment and genre count changes\n",
    );

    out
}
