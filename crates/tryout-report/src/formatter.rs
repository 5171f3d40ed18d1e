// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Human-readable output.

use std::path::Path;

use tryout_ast::TestRun;
use tryout_engine::{CaseError, ExpectationOutcome, PhaseOutcome, ResultLedger, TestResult};

use crate::style;
use crate::summary::RunSummary;

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Show passing expectations and captured output.
    pub verbose: bool,
    /// Only show failing cases.
    pub fails_only: bool,
    /// Only show phase failures and the final summary.
    pub quiet: bool,
    pub stack_traces: bool,
}

/// Renders ledgers as text. Every method returns the rendered lines, ready
/// to print; an empty string means there is nothing to show.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    options: FormatOptions,
}

impl Formatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Everything for one executed file.
    pub fn file<V>(&self, run: &TestRun, ledger: &ResultLedger<'_, V>) -> String {
        let mut lines = Vec::new();
        if !self.options.quiet {
            for warning in &run.warnings {
                lines.push(format!("  {}: {}", style::warning_label(), warning));
            }
        }
        if let Some(setup) = &ledger.setup {
            self.phase(&mut lines, setup);
        }
        if !self.options.quiet {
            for result in ledger.iter() {
                self.case_lines(&mut lines, result);
            }
        }
        if let Some(teardown) = &ledger.teardown {
            self.phase(&mut lines, teardown);
        }
        if lines.is_empty() && (self.options.quiet || self.options.fails_only) {
            return String::new();
        }
        if !self.options.quiet {
            lines.push(format!(
                "  {}, {}",
                style::passed_count(ledger.passed()),
                style::failed_count(ledger.failed())
            ));
        }

        let mut out = vec![style::file_path(&run.source_file.display().to_string()).to_string()];
        out.extend(lines);
        join(out)
    }

    /// The lines for one case, or an empty string when it is hidden.
    pub fn case<V>(&self, result: &TestResult<'_, V>) -> String {
        let mut lines = Vec::new();
        self.case_lines(&mut lines, result);
        join(lines)
    }

    pub fn parse_error(&self, path: &Path, message: &str) -> String {
        format!("{}: {}: {}", style::error_label(), style::file_path(&path.display().to_string()), message)
    }

    pub fn summary(&self, summary: &RunSummary) -> String {
        let mut lines = vec![
            style::separator(50).to_string(),
            format!(
                "{} {}, {} {}, {}, {}",
                summary.files,
                plural(summary.files, "file", "files"),
                summary.total,
                plural(summary.total, "test", "tests"),
                style::passed_count(summary.passed),
                style::failed_count(summary.failed)
            ),
        ];
        let mut problems = Vec::new();
        if summary.setup_failures > 0 {
            problems.push(format!(
                "{} setup {}",
                summary.setup_failures,
                plural(summary.setup_failures, "failure", "failures")
            ));
        }
        if summary.teardown_failures > 0 {
            problems.push(format!(
                "{} teardown {}",
                summary.teardown_failures,
                plural(summary.teardown_failures, "failure", "failures")
            ));
        }
        if summary.parse_errors > 0 {
            problems.push(format!(
                "{} parse {}",
                summary.parse_errors,
                plural(summary.parse_errors, "error", "errors")
            ));
        }
        if !problems.is_empty() {
            lines.push(style::phase_failure(&problems.join(", ")).to_string());
        }
        join(lines)
    }

    fn phase(&self, lines: &mut Vec<String>, phase: &PhaseOutcome) {
        if let Some(error) = &phase.error {
            lines.push(format!("  {}", style::phase_failure(&error.to_string())));
            self.error_detail(lines, error.cause(), "    ");
        }
        if self.options.verbose {
            captured(lines, "stdout", &phase.stdout, "    ");
            captured(lines, "stderr", &phase.stderr, "    ");
        }
    }

    fn case_lines<V>(&self, lines: &mut Vec<String>, result: &TestResult<'_, V>) {
        if result.success && (self.options.fails_only || self.options.quiet) {
            return;
        }
        let case = result.test_case;
        let status = if result.success { style::status_pass() } else { style::status_fail() };
        lines.push(format!(
            "  {} {}  {}",
            status,
            style::line_range(&case.line_range.to_string()),
            case.title()
        ));

        let show_all = self.options.verbose;
        if !result.success || show_all {
            for extra in case.description.lines().skip(1) {
                lines.push(format!("             {}", style::detail(extra)));
            }
            for outcome in &result.expectations {
                if !outcome.passed || show_all {
                    expectation(lines, outcome);
                }
            }
            if let Some(error) = &result.error {
                self.error_detail(lines, error, "      ");
            }
        }
        if show_all {
            if let Some(value) = &result.value_repr {
                lines.push(format!("      value: {}", value));
            }
            captured(lines, "stdout", &result.stdout, "      ");
            captured(lines, "stderr", &result.stderr, "      ");
            lines.push(format!("      {}", style::detail(&format!("{:.3}ms", result.elapsed.as_secs_f64() * 1000.0))));
        }
    }

    fn error_detail(&self, lines: &mut Vec<String>, error: &CaseError, indent: &str) {
        let at = match error {
            CaseError::Raised { line: Some(line), .. } => format!(" (line {})", line + 1),
            _ => String::new(),
        };
        lines.push(format!("{}{}: {}{}", indent, style::error_label(), error, at));
        if self.options.stack_traces {
            for frame in error.trace() {
                lines.push(format!("{}  at {}", indent, style::detail(frame)));
            }
        }
    }
}

fn expectation(lines: &mut Vec<String>, outcome: &ExpectationOutcome<'_>) {
    let exp = outcome.expectation;
    let status = if outcome.passed { style::status_pass() } else { style::status_fail() };
    let written = if exp.payload.is_empty() {
        exp.kind.marker().to_string()
    } else {
        format!("{} {}", exp.kind.marker(), exp.payload)
    };
    lines.push(format!(
        "      {} {} {}",
        status,
        style::marker(&written),
        style::detail(&format!("(line {})", exp.source_line + 1))
    ));
    if !outcome.passed {
        lines.push(format!("          expected: {}", outcome.expected));
        lines.push(format!("          actual:   {}", outcome.actual));
        if let Some(detail) = &outcome.detail {
            lines.push(format!("          {}", style::detail(detail)));
        }
    }
}

fn captured(lines: &mut Vec<String>, stream: &str, text: &str, indent: &str) {
    if text.is_empty() {
        return;
    }
    lines.push(format!("{}{}:", indent, stream));
    for line in text.lines() {
        lines.push(format!("{}  | {}", indent, line));
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

fn join(lines: Vec<String>) -> String {
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryout_engine::{ContextMode, EngineConfig, TestBatch};
    use tryout_rhai::RhaiEvaluator;

    const SOURCE: &str = "## adds\n1 + 1\n#=> 2\n\n## wrong\n1 + 1\n#=> 3\n";

    fn render(options: FormatOptions) -> String {
        colored::control::set_override(false);
        let run = tryout_parser::parse(SOURCE, "math_try.rhai").unwrap();
        let ev = RhaiEvaluator::new();
        let mut batch = TestBatch::new(&run, ContextMode::Shared, &ev, &ev, EngineConfig::default());
        batch.run();
        Formatter::new(options).file(&run, batch.ledger())
    }

    #[test]
    fn failures_show_expected_and_actual() {
        let out = render(FormatOptions::default());
        assert!(out.starts_with("math_try.rhai\n"));
        assert!(out.contains("✓     1-3  adds"));
        assert!(out.contains("✗     5-7  wrong"));
        assert!(out.contains("#=> 3 (line 7)"));
        assert!(out.contains("expected: 3"));
        assert!(out.contains("actual:   2"));
        assert!(out.ends_with("1 passed, 1 failed"));
    }

    #[test]
    fn fails_only_hides_passing_cases() {
        let out = render(FormatOptions { fails_only: true, ..Default::default() });
        assert!(!out.contains("adds"));
        assert!(out.contains("wrong"));
    }

    #[test]
    fn quiet_shows_nothing_for_plain_failures() {
        assert_eq!(render(FormatOptions { quiet: true, ..Default::default() }), "");
    }

    #[test]
    fn verbose_shows_values() {
        let out = render(FormatOptions { verbose: true, ..Default::default() });
        assert!(out.contains("value: 2"));
        assert!(out.contains("✓ #=> 2 (line 3)"));
    }

    #[test]
    fn summary_lists_problems() {
        colored::control::set_override(false);
        let summary = RunSummary { files: 2, total: 3, passed: 2, failed: 1, setup_failures: 1, ..Default::default() };
        let out = Formatter::default().summary(&summary);
        assert!(out.contains("2 files, 3 tests, 2 passed, 1 failed"));
        assert!(out.ends_with("1 setup failure"));
    }
}
