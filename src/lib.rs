//! STMA Harness - load generation and grading for the STMA sensing agent
//!
//! The `load` tool launches marker processes on a schedule and writes a
//! manifest of what ran. The `compare` tool grades the agent's detection
//! report against that manifest.

pub mod cli;
pub mod commands;
pub mod common;
pub mod compare;
pub mod load;
pub mod marker;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use compare::{evaluate, Evaluation, Outcome, Record};
pub use load::{
    execute_load, ExecuteOptions, LoadDescriptor, LoadItem, ManifestEntry, RunResult, Workload,
};
