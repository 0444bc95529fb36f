//! Result comparison
//!
//! Grades an agent's detection report against the load manifest: one
//! aggregate count check, then one pass/fail grade per manifest record.

mod grade;
mod records;

pub use grade::{
    equivalent, equivalent_records, evaluate, find_first_match, print_evaluation, render_lines,
    CountCheck, Evaluation, Grade, Outcome,
};
pub use records::{describe, load_records, parse_records, InputKind, Record, MATCH_KEY};

use std::path::Path;

use crate::common::Result;

/// Load both files and grade the report against the manifest
pub fn compare_files(manifest: &Path, report: &Path) -> Result<Evaluation> {
    let manifest = load_records(manifest, InputKind::Manifest)?;
    let report = load_records(report, InputKind::Report)?;
    let evaluation = evaluate(&manifest, &report);
    tracing::info!(
        records = evaluation.grades.len(),
        failures = evaluation.failures(),
        "Graded agent report"
    );
    Ok(evaluation)
}
