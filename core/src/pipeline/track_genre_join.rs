//! Stage 1: reduce-side join of track years with genre annotations.
//!
//! Both sources are keyed by track id and shuffled to the same partition,
//! where each group is split back into its year facts and genre facts. A
//! track present on both sides emits the full cross product of its years
//! and genres; a track missing either side emits nothing (inner join).

use crate::records::{TrackGenreFact, TrackYearFact, YearGenre};
use crate::scheduler::{ComputeFn, LocalScheduler, Task};
use crate::shuffle::{HashPartitioner, partition_pairs};
use crate::traits::{BasicPartition, Partition};
use listenomics_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Tagged value of the join shuffle: which source a record came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackFact {
    Year(i32),
    Genre(String),
}

/// Stage 1 of the pipeline.
pub struct TrackGenreJoin {
    partitioner: Arc<HashPartitioner>,
    scheduler: LocalScheduler,
}

impl TrackGenreJoin {
    pub fn new(num_partitions: usize) -> Self {
        Self {
            partitioner: Arc::new(HashPartitioner::new(num_partitions.max(1) as u32)),
            scheduler: LocalScheduler::with_default_threads(),
        }
    }

    /// Join the two fact streams into (year, genre) observations.
    ///
    /// Output row order is unspecified; Stage 2 does not depend on it.
    pub fn run(
        &self,
        years: Vec<TrackYearFact>,
        genres: Vec<TrackGenreFact>,
    ) -> Result<Vec<YearGenre>> {
        let mut tagged: Vec<(String, TrackFact)> = Vec::with_capacity(years.len() + genres.len());
        tagged.extend(
            years
                .into_iter()
                .map(|fact| (fact.track_id, TrackFact::Year(fact.year))),
        );
        tagged.extend(
            genres
                .into_iter()
                .map(|fact| (fact.track_id, TrackFact::Genre(fact.genre))),
        );

        let buckets = Arc::new(partition_pairs(tagged, self.partitioner.as_ref()));
        let tasks: Vec<Task<YearGenre>> = (0..buckets.len())
            .map(|i| {
                let buckets = Arc::clone(&buckets);
                let compute: ComputeFn<YearGenre> = Arc::new(move |partition: &dyn Partition| {
                    Ok(join_partition(&buckets[partition.index()]))
                });
                Task::new(Box::new(BasicPartition::new(i)), compute)
            })
            .collect();

        self.scheduler.execute_and_collect(tasks)
    }
}

// Group one partition's tagged records by track id and emit the cross
// product of years x genres for every track present on both sides.
fn join_partition(records: &[(String, TrackFact)]) -> Vec<YearGenre> {
    let mut groups: HashMap<&str, (Vec<i32>, Vec<&str>)> = HashMap::new();
    for (track_id, fact) in records {
        let group = groups.entry(track_id.as_str()).or_default();
        match fact {
            TrackFact::Year(year) => group.0.push(*year),
            TrackFact::Genre(genre) => group.1.push(genre.as_str()),
        }
    }

    let mut joined = Vec::new();
    for (_track_id, (years, genres)) in groups {
        // Inner join: a track with no year or no genre contributes nothing
        if years.is_empty() || genres.is_empty() {
            continue;
        }

        for &year in &years {
            for &genre in &genres {
                joined.push(YearGenre {
                    year,
                    genre: genre.to_string(),
                });
            }
        }
    }

    joined
}
