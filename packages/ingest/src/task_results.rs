//! Per-run store for values handed from one step to another.

use std::collections::HashMap;

use serde_json::Value;

/// Values published by steps during a single run, keyed by
/// `(task_id, key)`.
///
/// A fresh store is created for every run; nothing survives between runs.
#[derive(Debug, Clone, Default)]
pub struct TaskResults {
    values: HashMap<(String, String), Value>,
}

impl TaskResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `value` under `key` for `task_id`, replacing any earlier
    /// value from a previous attempt.
    pub fn push(&mut self, task_id: &str, key: &str, value: Value) {
        self.values
            .insert((task_id.to_owned(), key.to_owned()), value);
    }

    /// Returns the value `task_id` published under `key`, if any.
    #[must_use]
    pub fn pull(&self, task_id: &str, key: &str) -> Option<&Value> {
        self.values.get(&(task_id.to_owned(), key.to_owned()))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
