//! Comparator inputs
//!
//! Both the manifest and the agent report are read as untyped JSON objects,
//! so report entries with unexpected keys load fine and are graded rather
//! than rejected.

use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

use crate::common::{Error, Result};

/// Key used to pair manifest and report records
pub const MATCH_KEY: &str = "pid";

/// One manifest or report record
pub type Record = Map<String, Value>;

/// Which comparator input a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Manifest,
    Report,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Manifest => write!(f, "manifest"),
            InputKind::Report => write!(f, "report"),
        }
    }
}

impl InputKind {
    fn malformed(self, path: &Path, reason: impl Into<String>) -> Error {
        let path = path.display().to_string();
        let reason = reason.into();
        match self {
            InputKind::Manifest => Error::MalformedManifest { path, reason },
            InputKind::Report => Error::MalformedReport { path, reason },
        }
    }
}

/// Read a JSON array of records from `path`
pub fn load_records(path: &Path, kind: InputKind) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    let records = parse_records(&content).map_err(|reason| kind.malformed(path, reason))?;
    tracing::debug!(path = %path.display(), %kind, records = records.len(), "Loaded records");
    Ok(records)
}

/// Parse a JSON array of objects, each carrying the match key
pub fn parse_records(content: &str) -> std::result::Result<Vec<Record>, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let Value::Array(items) = value else {
        return Err("expected a JSON array of records".to_string());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) if record.contains_key(MATCH_KEY) => Ok(record),
            Value::Object(_) => Err(format!("record {} has no '{}' key", i, MATCH_KEY)),
            other => Err(format!("record {} is not an object: {}", i, other)),
        })
        .collect()
}

/// Render a record the way it appears in grade lines
pub fn describe(record: &Record) -> String {
    Value::Object(record.clone()).to_string()
}
