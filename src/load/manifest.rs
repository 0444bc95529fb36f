//! Load manifest
//!
//! The manifest is the ground-truth record of what a run launched: a JSON
//! array with one entry per workload process, written once at the end of the
//! run.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::executor::RunResult;
use crate::common::{Error, Result};

/// One manifest record
///
/// Fields serialize in declaration order: `pid, rc, tag, exe, count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub pid: u32,
    pub rc: i32,
    /// What the workload printed, which for the marker is its launch tag
    pub tag: String,
    pub exe: String,
    pub count: u32,
}

impl From<&RunResult> for ManifestEntry {
    fn from(result: &RunResult) -> Self {
        Self {
            pid: result.pid,
            rc: result.return_code,
            tag: result.stdout.clone(),
            exe: result.exe_name.clone(),
            count: result.expected_count,
        }
    }
}

/// Write the manifest for `results`, replacing any existing file
pub fn write_manifest(results: &[RunResult], path: &Path) -> Result<Vec<ManifestEntry>> {
    let entries: Vec<ManifestEntry> = results.iter().map(ManifestEntry::from).collect();
    let json = serde_json::to_string(&entries)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::file_write(path, e))?;
    }
    std::fs::write(path, json).map_err(|e| Error::file_write(path, e))?;

    tracing::info!(path = %path.display(), entries = entries.len(), "Wrote load manifest");
    Ok(entries)
}

/// Read a manifest back as typed entries
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::MalformedManifest {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
