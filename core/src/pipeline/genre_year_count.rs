//! Stage 2: count observations per (year, genre).
//!
//! A partitioned count aggregation over the Stage 1 output. Counting is
//! associative and commutative, so partial counts may be pre-combined
//! within each input partition before the shuffle; the pre-combine is a
//! pure optimization and never changes the final counts.

use crate::records::{GenreYearCount, YearGenre};
use crate::scheduler::LocalScheduler;
use crate::shuffle::{Aggregator, CountAggregator, HashPartitioner, Partitioner, combine_by_key, split_evenly};
use listenomics_common::Result;
use std::sync::Arc;

/// Stage 2 of the pipeline.
pub struct GenreYearAggregator {
    num_partitions: usize,
    partitioner: Arc<HashPartitioner>,
    scheduler: LocalScheduler,
    map_side_combine: bool,
}

impl GenreYearAggregator {
    pub fn new(num_partitions: usize) -> Self {
        let num_partitions = num_partitions.max(1);
        Self {
            num_partitions,
            partitioner: Arc::new(HashPartitioner::new(num_partitions as u32)),
            scheduler: LocalScheduler::with_default_threads(),
            map_side_combine: true,
        }
    }

    /// Toggle the map-side pre-combine. On by default.
    pub fn with_map_side_combine(mut self, enabled: bool) -> Self {
        self.map_side_combine = enabled;
        self
    }

    /// Count a materialized input stream. The stream is split into input
    /// partitions internally; splits carry no meaning for the result.
    pub fn run(&self, input: Vec<YearGenre>) -> Result<Vec<GenreYearCount>> {
        self.run_partitioned(split_evenly(input, self.num_partitions))
    }

    /// Count an already-partitioned input stream. Output row order is
    /// unspecified.
    pub fn run_partitioned(&self, inputs: Vec<Vec<YearGenre>>) -> Result<Vec<GenreYearCount>> {
        let inputs: Vec<Vec<((i32, String), ())>> = inputs
            .into_iter()
            .map(|chunk| {
                chunk
                    .into_iter()
                    .map(|row| ((row.year, row.genre), ()))
                    .collect()
            })
            .collect();

        let aggregator: Arc<dyn Aggregator<(i32, String), (), u64>> =
            Arc::new(CountAggregator::new());
        let partitioner: Arc<dyn Partitioner<(i32, String)>> = self.partitioner.clone();

        let counted = combine_by_key(
            inputs,
            aggregator,
            partitioner,
            &self.scheduler,
            self.map_side_combine,
        )?;

        Ok(counted
            .into_iter()
            .map(|((year, genre), count)| GenreYearCount { year, genre, count })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, genre: &str) -> YearGenre {
        YearGenre {
            year,
            genre: genre.to_string(),
        }
    }

    fn sample_rows() -> Vec<YearGenre> {
        vec![
            row(1991, "rock"),
            row(1991, "rock"),
            row(1991, "jazz"),
            row(1992, "rock"),
            row(1991, "rock"),
        ]
    }

    fn run_sorted(aggregator: &GenreYearAggregator, input: Vec<YearGenre>) -> Vec<GenreYearCount> {
        let mut counts = aggregator.run(input).unwrap();
        counts.sort();
        counts
    }

    #[test]
    fn test_counts_per_year_genre() {
        let counts = run_sorted(&GenreYearAggregator::new(4), sample_rows());
        assert_eq!(
            counts,
            vec![
                GenreYearCount { year: 1991, genre: "jazz".to_string(), count: 1 },
                GenreYearCount { year: 1991, genre: "rock".to_string(), count: 3 },
                GenreYearCount { year: 1992, genre: "rock".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_counts_invariant_under_partitioning_and_pre_combine() {
        let baseline = run_sorted(&GenreYearAggregator::new(1), sample_rows());

        for num_partitions in [1, 2, 4, 9] {
            for map_side_combine in [false, true] {
                let aggregator = GenreYearAggregator::new(num_partitions)
                    .with_map_side_combine(map_side_combine);
                assert_eq!(run_sorted(&aggregator, sample_rows()), baseline);
            }
        }
    }

    #[test]
    fn test_counts_invariant_under_input_splits() {
        let aggregator = GenreYearAggregator::new(3);
        let baseline = run_sorted(&aggregator, sample_rows());

        // a lopsided manual split must count the same
        let rows = sample_rows();
        let inputs = vec![rows[..1].to_vec(), Vec::new(), rows[1..].to_vec()];
        let mut counts = aggregator.run_partitioned(inputs).unwrap();
        counts.sort();
        assert_eq!(counts, baseline);
    }

    #[test]
    fn test_empty_input() {
        let counts = GenreYearAggregator::new(4).run(Vec::new()).unwrap();
        assert!(counts.is_empty());
    }
}
