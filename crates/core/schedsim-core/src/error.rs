//! Error types for Schedsim

use thiserror::Error;

/// Core error type for policy runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// Rejected before the simulation starts: empty workload, zero-length
    /// task, zero quantum and the like.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A policy's event loop broke one of its own guarantees.
    #[error("Internal invariant violation: {0}")]
    InternalInvariantViolation(String),
}

impl SchedError {
    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invariant-violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InternalInvariantViolation(msg.into())
    }
}
