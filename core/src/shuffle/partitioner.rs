//! Defines partitioners for distributing data in a shuffle.

use std::hash::{Hash, Hasher};

/// Routes keys to partitions. All records sharing a key land on the same
/// partition, which is what makes the group-wise stage logic correct.
pub trait Partitioner<K>: Send + Sync {
    fn num_partitions(&self) -> u32;

    fn get_partition(&self, key: &K) -> u32;
}

/// A partitioner that uses the hash of the key to distribute data.
#[derive(Clone, Debug)]
pub struct HashPartitioner {
    num_partitions: u32,
    seed: u64,
}

impl HashPartitioner {
    pub fn new(num_partitions: u32) -> Self {
        assert!(num_partitions > 0, "Number of partitions must be positive.");
        Self {
            num_partitions,
            seed: 0, // Default seed
        }
    }

    pub fn with_seed(num_partitions: u32, seed: u64) -> Self {
        assert!(num_partitions > 0, "Number of partitions must be positive.");
        Self {
            num_partitions,
            seed,
        }
    }
}

impl<K: HashPartitionable> Partitioner<K> for HashPartitioner {
    fn num_partitions(&self) -> u32 {
        self.num_partitions
    }

    fn get_partition(&self, key: &K) -> u32 {
        key.get_partition_with_seed(self.num_partitions, self.seed)
    }
}

/// A specific partitioner for types that implement Hash
pub trait HashPartitionable: Hash + Send + Sync {
    fn get_partition(&self, num_partitions: u32) -> u32 {
        self.get_partition_with_seed(num_partitions, 0)
    }

    fn get_partition_with_seed(&self, num_partitions: u32, seed: u64) -> u32 {
        let mut s = std::collections::hash_map::DefaultHasher::new();
        seed.hash(&mut s);
        self.hash(&mut s);
        (s.finish() % num_partitions as u64) as u32
    }
}

// Implement for common types
impl HashPartitionable for i32 {}
impl HashPartitionable for i64 {}
impl HashPartitionable for u32 {}
impl HashPartitionable for u64 {}
impl HashPartitionable for String {}
impl HashPartitionable for &str {}
impl<A: Hash + Send + Sync, B: Hash + Send + Sync> HashPartitionable for (A, B) {}
