//! Core types shared across Schedsim components

use serde::{Deserialize, Serialize};

/// Simulated time, in ticks
pub type Ticks = u64;

/// Task identifier (not required to be unique)
pub type TaskId = u64;

/// A task in a workload
///
/// Immutable input to every policy. Policies never mutate it; they run over
/// a private working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub length: Ticks,       // CPU burst required to complete
    pub arrival_time: Ticks, // When the task becomes ready
}

impl Task {
    pub fn new(id: TaskId, length: Ticks, arrival_time: Ticks) -> Self {
        Task {
            id,
            length,
            arrival_time,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "task {} (length {}, arrival {})",
            self.id, self.length, self.arrival_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_json_shape() {
        let task = Task::new(3, 8, 2);
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"id":3,"length":8,"arrival_time":2}"#);
    }
}
