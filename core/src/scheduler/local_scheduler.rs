//! Local Task Scheduler
//!
//! This module provides a local task scheduler that uses Rayon's thread pool
//! to execute per-partition stage work in parallel on a single machine.

use crate::traits::Partition;
use listenomics_common::Result;
use rayon::prelude::*;
use std::fmt::Debug;
use std::sync::Arc;

/// Task represents a unit of work to be executed
pub struct Task<T> {
    pub partition: Box<dyn Partition>,
    pub compute_fn: ComputeFn<T>,
}

/// Type alias for complex compute function type
pub type ComputeFn<T> = Arc<dyn Fn(&dyn Partition) -> Result<Vec<T>> + Send + Sync>;

impl<T> Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("partition", &self.partition)
            .field("compute_fn", &"<function>")
            .finish()
    }
}

impl<T> Task<T> {
    pub fn new(partition: Box<dyn Partition>, compute_fn: ComputeFn<T>) -> Self {
        Self {
            partition,
            compute_fn,
        }
    }

    pub fn execute(&self) -> Result<Vec<T>> {
        (self.compute_fn)(self.partition.as_ref())
    }
}

/// LocalScheduler manages parallel execution of tasks using Rayon.
/// A failing task fails the whole batch; there are no record-level retries.
#[derive(Debug)]
pub struct LocalScheduler {
    /// Number of threads in the thread pool
    num_threads: usize,
}

impl LocalScheduler {
    /// Create a new LocalScheduler with the specified number of threads
    pub fn new(num_threads: usize) -> Self {
        Self { num_threads }
    }

    /// Create a new LocalScheduler with the default number of threads (CPU cores)
    pub fn with_default_threads() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Get the number of threads
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Execute a collection of tasks in parallel, one result vector per task
    pub fn execute_tasks<T>(&self, tasks: Vec<Task<T>>) -> Result<Vec<Vec<T>>>
    where
        T: Send + Sync + Debug,
    {
        tasks.into_par_iter().map(|task| task.execute()).collect()
    }

    /// Execute a collection of tasks and collect all results into a single vector
    pub fn execute_and_collect<T>(&self, tasks: Vec<Task<T>>) -> Result<Vec<T>>
    where
        T: Send + Sync + Debug,
    {
        let partition_results = self.execute_tasks(tasks)?;
        let mut result = Vec::new();
        for partition_data in partition_results {
            result.extend(partition_data);
        }
        Ok(result)
    }
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::with_default_threads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BasicPartition;
    use listenomics_common::Error;

    fn create_test_tasks(num_tasks: usize) -> Vec<Task<i32>> {
        (0..num_tasks)
            .map(|i| {
                let compute_fn: ComputeFn<i32> = Arc::new(move |p: &dyn Partition| {
                    Ok(vec![(p.index() * 10) as i32, (p.index() * 10 + 1) as i32])
                });
                Task::new(Box::new(BasicPartition::new(i)), compute_fn)
            })
            .collect()
    }

    #[test]
    fn test_local_scheduler_new() {
        let scheduler = LocalScheduler::new(4);
        assert_eq!(scheduler.num_threads(), 4);
    }

    #[test]
    fn test_local_scheduler_with_default_threads() {
        let scheduler = LocalScheduler::with_default_threads();
        assert!(scheduler.num_threads() > 0);
    }

    #[test]
    fn test_execute_tasks() {
        let scheduler = LocalScheduler::default();
        let tasks = create_test_tasks(3);
        let results = scheduler.execute_tasks(tasks).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], vec![0, 1]);
        assert_eq!(results[1], vec![10, 11]);
        assert_eq!(results[2], vec![20, 21]);
    }

    #[test]
    fn test_execute_and_collect() {
        let scheduler = LocalScheduler::default();
        let tasks = create_test_tasks(3);
        let result = scheduler.execute_and_collect(tasks).unwrap();

        assert_eq!(result, vec![0, 1, 10, 11, 20, 21]);
    }

    #[test]
    fn test_failing_task_fails_batch() {
        let scheduler = LocalScheduler::default();
        let mut tasks = create_test_tasks(2);
        let failing: ComputeFn<i32> =
            Arc::new(|_p: &dyn Partition| Err(Error::computation_error("corrupt group")));
        tasks.push(Task::new(Box::new(BasicPartition::new(2)), failing));

        let result = scheduler.execute_tasks(tasks);
        assert!(matches!(result, Err(Error::Computation { .. })));
    }
}
