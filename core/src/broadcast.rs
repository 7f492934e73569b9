//! Broadcast variables implementation
//!
//! Broadcast variables keep a read-only value shared by every worker of a
//! map-side join instead of shipping a copy of it with each task. The value
//! is built once before the consuming stage starts and never mutated after
//! construction, so concurrent reads need no synchronization.

use std::sync::Arc;

/// Broadcast variable that holds a read-only value
#[derive(Debug, Clone)]
pub struct BroadcastVariable<T> {
    value: Arc<T>,
}

impl<T> BroadcastVariable<T> {
    /// Create a new broadcast variable with the given value
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    /// Get the value of this broadcast variable
    pub fn value(&self) -> &T {
        &self.value
    }
}
