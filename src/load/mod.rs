//! Load generation
//!
//! Launches marker workloads according to a load descriptor, waits for all
//! of them and records what ran in a manifest.

mod descriptor;
mod executor;
mod manifest;
mod workload;

pub use descriptor::{expected_detections, LoadDescriptor, LoadItem};
pub use executor::{execute_load, join_output, ExecuteOptions, RunResult};
pub use manifest::{read_manifest, write_manifest, ManifestEntry};
pub use workload::{Workload, MARKER_SUBCOMMAND};
