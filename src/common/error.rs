//! Error types for the STMA harness
//!
//! Harness-level failures (spawning, file IO, malformed input) are fatal and
//! surface through this type. Comparison mismatches are not errors; they are
//! recorded as failed grades by the comparator.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Workload Errors ===
    #[error("Workload program '{name}' not found. Searched: {searched}")]
    WorkloadNotFound { name: String, searched: String },

    #[error("Failed to spawn workload '{program}' for tag '{tag}': {source}")]
    SpawnFailed {
        program: String,
        tag: String,
        #[source]
        source: io::Error,
    },

    // === Descriptor Errors ===
    #[error("Invalid load descriptor: {0}")]
    InvalidDescriptor(String),

    // === Collection Errors ===
    #[error("Process {pid} (tag '{tag}') did not exit within {secs} seconds")]
    CollectTimeout { pid: u32, tag: String, secs: u64 },

    #[error("Failed to collect process {pid}: {source}")]
    CollectFailed {
        pid: u32,
        #[source]
        source: io::Error,
    },

    // === Input File Errors ===
    #[error("Malformed manifest '{path}': {reason}")]
    MalformedManifest { path: String, reason: String },

    #[error("Malformed report '{path}': {reason}")]
    MalformedReport { path: String, reason: String },

    // === Grading Errors ===
    #[error("{0} check(s) failed")]
    ChecksFailed(usize),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a workload not found error with search paths
    pub fn workload_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::WorkloadNotFound {
            name: name.to_string(),
            searched: paths.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a file read error for `path`
    pub fn file_read(path: &Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file write error for `path`
    pub fn file_write(path: &Path, error: impl ToString) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
