//! Stage 3: map-side join against the broadcast unemployment table.
//!
//! No shuffle is needed: the reference table is small enough to sit in
//! memory, so every worker reads it through a shared broadcast handle and
//! each input partition is enriched independently. Rows whose year has no
//! rate are dropped; there is no interpolation and no default.

use crate::broadcast::BroadcastVariable;
use crate::records::{EnrichedRecord, GenreYearCount};
use crate::scheduler::{ComputeFn, LocalScheduler, Task};
use crate::shuffle::split_evenly;
use crate::traits::{BasicPartition, Partition};
use crate::unemployment::UnemploymentTable;
use listenomics_common::Result;
use std::sync::Arc;
use tracing::debug;

/// Stage 3 of the pipeline.
pub struct UnemploymentBroadcastJoin {
    table: BroadcastVariable<UnemploymentTable>,
    num_partitions: usize,
    scheduler: LocalScheduler,
}

impl UnemploymentBroadcastJoin {
    pub fn new(table: BroadcastVariable<UnemploymentTable>, num_partitions: usize) -> Self {
        Self {
            table,
            num_partitions: num_partitions.max(1),
            scheduler: LocalScheduler::with_default_threads(),
        }
    }

    /// Enrich count rows with the rate for their year.
    pub fn run(&self, input: Vec<GenreYearCount>) -> Result<Vec<EnrichedRecord>> {
        let total = input.len();
        let chunks = Arc::new(split_evenly(input, self.num_partitions));

        let tasks: Vec<Task<EnrichedRecord>> = (0..chunks.len())
            .map(|i| {
                let chunks = Arc::clone(&chunks);
                let table = self.table.clone();
                let compute: ComputeFn<EnrichedRecord> =
                    Arc::new(move |partition: &dyn Partition| {
                        let enriched = chunks[partition.index()]
                            .iter()
                            .filter_map(|row| {
                                table.value().rate(row.year).map(|rate| EnrichedRecord {
                                    year: row.year,
                                    genre: row.genre.clone(),
                                    count: row.count,
                                    rate,
                                })
                            })
                            .collect();
                        Ok(enriched)
                    });
                Task::new(Box::new(BasicPartition::new(i)), compute)
            })
            .collect();

        let enriched = self.scheduler.execute_and_collect(tasks)?;
        if enriched.len() < total {
            debug!(
                dropped = total - enriched.len(),
                "dropped rows with no unemployment rate for their year"
            );
        }
        Ok(enriched)
    }
}
