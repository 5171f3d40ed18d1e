// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON output for machine consumption.
//!
//! Use `--format json` to get one [`RunReport`] covering every file.

use serde::Serialize;
use tryout_ast::{ExpectationKind, TestRun};
use tryout_engine::{CaseError, ExpectationOutcome, PhaseOutcome, ResultLedger, TestResult};

use crate::summary::{ExitStatus, RunSummary};

/// Schema version for forward compatibility.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub version: u32,
    pub files: Vec<FileReport>,
    pub summary: RunSummary,
    pub status: ExitStatus,
    pub exit_code: i32,
}

impl RunReport {
    pub fn new(files: Vec<FileReport>, summary: RunSummary) -> Self {
        let status = summary.exit_status();
        Self { version: SCHEMA_VERSION, files, summary, status, exit_code: status.code() }
    }
}

/// One file's results.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub success: bool,
    /// Set when the file could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<PhaseReport>,
    pub cases: Vec<CaseReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown: Option<PhaseReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct PhaseReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
    /// 1-based first and last line.
    pub start_line: usize,
    pub end_line: usize,
    pub description: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    pub expectations: Vec<ExpectationReport>,
    pub elapsed_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct ExpectationReport {
    pub kind: ExpectationKind,
    pub marker: &'static str,
    pub payload: String,
    /// 1-based.
    pub line: usize,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
    /// 1-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl FileReport {
    pub fn from_ledger<V>(run: &TestRun, ledger: &ResultLedger<'_, V>) -> Self {
        Self {
            file: run.source_file.display().to_string(),
            success: ledger.success(),
            parse_error: None,
            setup: ledger.setup.as_ref().map(PhaseReport::from_outcome),
            cases: ledger.iter().map(CaseReport::from_result).collect(),
            teardown: ledger.teardown.as_ref().map(PhaseReport::from_outcome),
            warnings: run.warnings.iter().map(|w| w.to_string()).collect(),
            passed: ledger.passed(),
            failed: ledger.failed(),
        }
    }

    pub fn parse_failure(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            success: false,
            parse_error: Some(message.into()),
            setup: None,
            cases: Vec::new(),
            teardown: None,
            warnings: Vec::new(),
            passed: 0,
            failed: 0,
        }
    }
}

impl PhaseReport {
    fn from_outcome(phase: &PhaseOutcome) -> Self {
        Self {
            success: !phase.failed(),
            error: phase.error.as_ref().map(|e| ErrorReport::from_error(e.cause())),
            stdout: phase.stdout.clone(),
            stderr: phase.stderr.clone(),
            elapsed_ms: phase.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

impl CaseReport {
    fn from_result<V>(result: &TestResult<'_, V>) -> Self {
        let case = result.test_case;
        Self {
            start_line: case.line_range.start + 1,
            end_line: case.line_range.end + 1,
            description: case.description.clone(),
            success: result.success,
            value: result.value_repr.clone(),
            stdout: result.stdout.clone(),
            stderr: result.stderr.clone(),
            error: result.error.as_ref().map(ErrorReport::from_error),
            expectations: result.expectations.iter().map(ExpectationReport::from_outcome).collect(),
            elapsed_ms: result.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

impl ExpectationReport {
    fn from_outcome(outcome: &ExpectationOutcome<'_>) -> Self {
        let exp = outcome.expectation;
        Self {
            kind: exp.kind,
            marker: exp.kind.marker(),
            payload: exp.payload.clone(),
            line: exp.source_line + 1,
            passed: outcome.passed,
            expected: outcome.expected.clone(),
            actual: outcome.actual.clone(),
            detail: outcome.detail.clone(),
        }
    }
}

impl ErrorReport {
    fn from_error(error: &CaseError) -> Self {
        match error {
            CaseError::Raised { kind, message, line, trace } => Self {
                kind: kind.clone(),
                message: message.clone(),
                line: line.map(|l| l + 1),
                trace: trace.clone(),
            },
            other => Self { kind: other.kind().to_string(), message: other.to_string(), line: None, trace: Vec::new() },
        }
    }
}

/// Serialize any report to pretty JSON.
pub fn to_json_string<T: Serialize>(report: &T) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tryout_engine::{ContextMode, EngineConfig, TestBatch};
    use tryout_rhai::RhaiEvaluator;

    #[test]
    fn file_report_shape() {
        let source = "## divides\n1 / 0\n#=> 1\n";
        let run = tryout_parser::parse(source, "div_try.rhai").unwrap();
        let ev = RhaiEvaluator::new();
        let mut batch = TestBatch::new(&run, ContextMode::Shared, &ev, &ev, EngineConfig::default());
        batch.run();
        let report = FileReport::from_ledger(&run, batch.ledger());
        let json: serde_json::Value = serde_json::from_str(&to_json_string(&report)).unwrap();

        assert_eq!(json["file"], "div_try.rhai");
        assert_eq!(json["success"], false);
        assert_eq!(json["failed"], 1);
        let case = &json["cases"][0];
        assert_eq!(case["start_line"], 1);
        assert_eq!(case["end_line"], 3);
        assert_eq!(case["error"]["kind"], "ZeroDivisionError");
        assert_eq!(case["error"]["line"], 2);
        assert_eq!(case["expectations"][0]["kind"], "equality");
        assert_eq!(case["expectations"][0]["marker"], "#=>");
        assert!(json.get("setup").is_none());
    }

    #[test]
    fn run_report_carries_exit_code() {
        let mut summary = RunSummary::default();
        summary.add_parse_error();
        let report = RunReport::new(vec![FileReport::parse_failure("bad_try.rhai", "line 2: stray code")], summary);
        let json: serde_json::Value = serde_json::from_str(&to_json_string(&report)).unwrap();
        assert_eq!(json["exit_code"], 2);
        assert_eq!(json["status"], "could_not_run");
        assert_eq!(json["files"][0]["parse_error"], "line 2: stray code");
        assert_eq!(json["version"], SCHEMA_VERSION);
    }
}
