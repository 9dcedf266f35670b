//! Schedsim Core - Shared types and traits
//!
//! This crate defines the core abstractions used by the simulation engine:
//! - Task records (the immutable workload input)
//! - SchedulingPolicy trait (the single `run` capability every policy exposes)
//! - Error types

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
