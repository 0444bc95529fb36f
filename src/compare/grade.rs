//! Grading an agent report against a manifest

use colored::Colorize;

use super::records::{describe, Record, MATCH_KEY};

/// Aggregate check: both inputs hold the same number of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountCheck {
    pub manifest: usize,
    pub report: usize,
}

impl CountCheck {
    pub fn passed(&self) -> bool {
        self.manifest == self.report
    }
}

/// Outcome for a single manifest record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// No report record shares the manifest record's pid
    MissingResult,
    /// The first report record with the same pid differs in some key or value
    MismatchingResult,
}

impl Outcome {
    pub fn passed(self) -> bool {
        self == Outcome::Pass
    }

    fn reason(self) -> Option<&'static str> {
        match self {
            Outcome::Pass => None,
            Outcome::MissingResult => Some("missing stma result"),
            Outcome::MismatchingResult => Some("mismatching result"),
        }
    }
}

/// Grade for one manifest record
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub record: Record,
    pub outcome: Outcome,
}

/// Full result of grading a report
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub count: CountCheck,
    pub grades: Vec<Grade>,
}

impl Evaluation {
    /// Whether the count check and every record grade passed
    pub fn passed(&self) -> bool {
        self.count.passed() && self.grades.iter().all(|g| g.outcome.passed())
    }

    /// Number of failed checks, count check included
    pub fn failures(&self) -> usize {
        let records = self.grades.iter().filter(|g| !g.outcome.passed()).count();
        records + usize::from(!self.count.passed())
    }
}

/// First report record whose pid equals the manifest record's pid
pub fn find_first_match<'a>(report: &'a [Record], record: &Record) -> Option<&'a Record> {
    let pid = record.get(MATCH_KEY)?;
    report.iter().find(|candidate| candidate.get(MATCH_KEY) == Some(pid))
}

/// One-directional check: every key in `a` maps to the same value in `b`
///
/// A key missing from `b` counts as a mismatch.
pub fn equivalent(a: &Record, b: &Record) -> bool {
    a.iter().all(|(key, value)| b.get(key) == Some(value))
}

/// Full equivalence: identical key sets, identical values, any key order
pub fn equivalent_records(a: &Record, b: &Record) -> bool {
    a.len() == b.len()
        && a.keys().all(|key| b.contains_key(key))
        && equivalent(a, b)
        && equivalent(b, a)
}

/// Grade `report` against `manifest`
///
/// The count check never short-circuits the per-record grades.
pub fn evaluate(manifest: &[Record], report: &[Record]) -> Evaluation {
    let count = CountCheck {
        manifest: manifest.len(),
        report: report.len(),
    };

    let grades = manifest
        .iter()
        .map(|record| {
            let outcome = match find_first_match(report, record) {
                None => Outcome::MissingResult,
                Some(found) if equivalent_records(record, found) => Outcome::Pass,
                Some(_) => Outcome::MismatchingResult,
            };
            Grade {
                record: record.clone(),
                outcome,
            }
        })
        .collect();

    Evaluation { count, grades }
}

/// Output lines paired with whether the check they report passed
fn verdict_lines(evaluation: &Evaluation) -> Vec<(bool, String)> {
    let mut lines = Vec::with_capacity(evaluation.grades.len() * 2 + 1);
    let count_passed = evaluation.count.passed();
    lines.push((
        count_passed,
        format!(
            "result count test: {}",
            if count_passed { "pass" } else { "fail" }
        ),
    ));

    for grade in &evaluation.grades {
        let shown = describe(&grade.record);
        let passed = grade.outcome.passed();
        if let Some(reason) = grade.outcome.reason() {
            lines.push((false, format!("test {}: fail due to {}", shown, reason)));
        }
        lines.push((
            passed,
            format!("test {}: {}", shown, if passed { "True" } else { "False" }),
        ));
    }
    lines
}

/// Text lines for an evaluation, without terminal colors
pub fn render_lines(evaluation: &Evaluation) -> Vec<String> {
    verdict_lines(evaluation)
        .into_iter()
        .map(|(_, line)| line)
        .collect()
}

/// Print an evaluation: grade lines on stdout, the tally on stderr
pub fn print_evaluation(evaluation: &Evaluation) {
    for (passed, line) in verdict_lines(evaluation) {
        if passed {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    }

    let summary = format!(
        "{} record(s), {} failed check(s)",
        evaluation.grades.len(),
        evaluation.failures()
    );
    if evaluation.passed() {
        eprintln!("{}", summary.green().bold());
    } else {
        eprintln!("{}", summary.red().bold());
    }
}
