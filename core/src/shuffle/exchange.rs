//! In-process shuffle exchange.
//!
//! Buckets key-value pairs by partitioner and runs the per-partition
//! group/merge work as scheduler tasks. Input ordering and input
//! partitioning carry no meaning: every record sharing a key is routed to
//! the same output partition before any group-wise logic runs.

use crate::scheduler::{ComputeFn, LocalScheduler, Task};
use crate::shuffle::{Aggregator, Partitioner};
use crate::traits::{BasicPartition, Data, Partition};
use listenomics_common::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Bucket pairs by the partition their key routes to.
pub fn partition_pairs<K, V, P>(pairs: Vec<(K, V)>, partitioner: &P) -> Vec<Vec<(K, V)>>
where
    P: Partitioner<K> + ?Sized,
{
    let mut buckets: Vec<Vec<(K, V)>> = Vec::new();
    buckets.resize_with(partitioner.num_partitions() as usize, Vec::new);

    for (key, value) in pairs {
        let partition = partitioner.get_partition(&key) as usize;
        buckets[partition].push((key, value));
    }

    buckets
}

/// Split a materialized input into `num_partitions` contiguous chunks,
/// padding with empty chunks when the input runs short.
pub fn split_evenly<T>(items: Vec<T>, num_partitions: usize) -> Vec<Vec<T>> {
    let num_partitions = num_partitions.max(1);
    let chunk_size = items.len().div_ceil(num_partitions).max(1);
    let mut iter = items.into_iter();
    (0..num_partitions)
        .map(|_| iter.by_ref().take(chunk_size).collect())
        .collect()
}

/// Combine values per key across arbitrarily partitioned inputs.
///
/// With `map_side_combine` enabled, each input partition is first folded
/// into partial combiners before the shuffle, and the reduce side merges
/// combiners; otherwise raw values are shuffled and folded on the reduce
/// side. Both paths must produce identical results for a lawful
/// (associative, commutative) aggregator.
pub fn combine_by_key<K, V, C>(
    inputs: Vec<Vec<(K, V)>>,
    aggregator: Arc<dyn Aggregator<K, V, C>>,
    partitioner: Arc<dyn Partitioner<K>>,
    scheduler: &LocalScheduler,
    map_side_combine: bool,
) -> Result<Vec<(K, C)>>
where
    K: Data + Hash + Eq,
    V: Data,
    C: Data,
{
    if map_side_combine {
        let inputs = Arc::new(inputs);
        let map_tasks: Vec<Task<(K, C)>> = (0..inputs.len())
            .map(|i| {
                let inputs = Arc::clone(&inputs);
                let aggregator = Arc::clone(&aggregator);
                let compute: ComputeFn<(K, C)> = Arc::new(move |partition: &dyn Partition| {
                    let mut combined: HashMap<K, C> = HashMap::new();
                    for (key, value) in &inputs[partition.index()] {
                        let next = match combined.remove(key) {
                            Some(c) => aggregator.merge_value(c, value.clone()),
                            None => aggregator.create_combiner(value.clone()),
                        };
                        combined.insert(key.clone(), next);
                    }
                    Ok(combined.into_iter().collect())
                });
                Task::new(Box::new(BasicPartition::new(i)), compute)
            })
            .collect();
        let partials = scheduler.execute_and_collect(map_tasks)?;

        let buckets = Arc::new(partition_pairs(partials, partitioner.as_ref()));
        let reduce_tasks: Vec<Task<(K, C)>> = (0..buckets.len())
            .map(|i| {
                let buckets = Arc::clone(&buckets);
                let aggregator = Arc::clone(&aggregator);
                let compute: ComputeFn<(K, C)> = Arc::new(move |partition: &dyn Partition| {
                    let mut merged: HashMap<K, C> = HashMap::new();
                    for (key, combiner) in &buckets[partition.index()] {
                        let next = match merged.remove(key) {
                            Some(c) => aggregator.merge_combiners(c, combiner.clone()),
                            None => combiner.clone(),
                        };
                        merged.insert(key.clone(), next);
                    }
                    Ok(merged.into_iter().collect())
                });
                Task::new(Box::new(BasicPartition::new(i)), compute)
            })
            .collect();
        scheduler.execute_and_collect(reduce_tasks)
    } else {
        let all: Vec<(K, V)> = inputs.into_iter().flatten().collect();
        let buckets = Arc::new(partition_pairs(all, partitioner.as_ref()));
        let reduce_tasks: Vec<Task<(K, C)>> = (0..buckets.len())
            .map(|i| {
                let buckets = Arc::clone(&buckets);
                let aggregator = Arc::clone(&aggregator);
                let compute: ComputeFn<(K, C)> = Arc::new(move |partition: &dyn Partition| {
                    let mut combined: HashMap<K, C> = HashMap::new();
                    for (key, value) in &buckets[partition.index()] {
                        let next = match combined.remove(key) {
                            Some(c) => aggregator.merge_value(c, value.clone()),
                            None => aggregator.create_combiner(value.clone()),
                        };
                        combined.insert(key.clone(), next);
                    }
                    Ok(combined.into_iter().collect())
                });
                Task::new(Box::new(BasicPartition::new(i)), compute)
            })
            .collect();
        scheduler.execute_and_collect(reduce_tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::{CountAggregator, HashPartitioner, ReduceAggregator};
    use std::collections::HashMap;

    fn sample_pairs() -> Vec<(String, ())> {
        ["rock", "jazz", "rock", "blues", "rock", "jazz"]
            .iter()
            .map(|g| (g.to_string(), ()))
            .collect()
    }

    #[test]
    fn test_partition_pairs_preserves_everything() {
        let partitioner = HashPartitioner::new(4);
        let buckets = partition_pairs(sample_pairs(), &partitioner);

        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets.iter().map(Vec::len).sum::<usize>(), 6);
    }

    #[test]
    fn test_partition_pairs_co_locates_keys() {
        let partitioner = HashPartitioner::new(4);
        let buckets = partition_pairs(sample_pairs(), &partitioner);

        // every occurrence of a key must be in exactly one bucket
        for key in ["rock", "jazz", "blues"] {
            let holding = buckets
                .iter()
                .filter(|b| b.iter().any(|(k, _)| k == key))
                .count();
            assert_eq!(holding, 1, "key {key} spread across buckets");
        }
    }

    #[test]
    fn test_split_evenly_covers_all_items() {
        let chunks = split_evenly((0..10).collect::<Vec<i32>>(), 3);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 10);

        let empty = split_evenly(Vec::<i32>::new(), 3);
        assert_eq!(empty.len(), 3);
        assert!(empty.iter().all(Vec::is_empty));
    }

    fn count_with(map_side_combine: bool, num_partitions: u32) -> HashMap<String, u64> {
        let scheduler = LocalScheduler::default();
        let partitioner: Arc<dyn Partitioner<String>> =
            Arc::new(HashPartitioner::new(num_partitions));
        let aggregator: Arc<dyn Aggregator<String, (), u64>> =
            Arc::new(CountAggregator::new());

        let inputs = split_evenly(sample_pairs(), num_partitions as usize);
        combine_by_key(inputs, aggregator, partitioner, &scheduler, map_side_combine)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_combine_by_key_counts() {
        let counts = count_with(true, 4);
        assert_eq!(counts["rock"], 3);
        assert_eq!(counts["jazz"], 2);
        assert_eq!(counts["blues"], 1);
    }

    #[test]
    fn test_pre_combine_does_not_change_counts() {
        let baseline = count_with(false, 1);
        for map_side_combine in [false, true] {
            for num_partitions in [1, 2, 4, 7] {
                assert_eq!(count_with(map_side_combine, num_partitions), baseline);
            }
        }
    }

    #[test]
    fn test_combine_by_key_with_reduce_aggregator() {
        let scheduler = LocalScheduler::default();
        let partitioner: Arc<dyn Partitioner<String>> = Arc::new(HashPartitioner::new(2));
        let aggregator: Arc<dyn Aggregator<String, i64, i64>> =
            Arc::new(ReduceAggregator::new(|a: i64, b: i64| a + b));

        let inputs = vec![
            vec![("a".to_string(), 1), ("b".to_string(), 10)],
            vec![("a".to_string(), 2), ("a".to_string(), 3)],
        ];
        let summed: HashMap<String, i64> =
            combine_by_key(inputs, aggregator, partitioner, &scheduler, true)
                .unwrap()
                .into_iter()
                .collect();

        assert_eq!(summed["a"], 6);
        assert_eq!(summed["b"], 10);
    }
}
