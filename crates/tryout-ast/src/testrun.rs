// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Code blocks, test cases, and the complete parsed test run.

use std::path::{Path, PathBuf};

use crate::expectation::Expectation;
use crate::span::LineRange;
use crate::warning::ParseWarning;

/// A contiguous run of source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CodeBlock {
    pub code: String,
    /// Lines the code was taken from. `None` when the block has no lines.
    pub line_range: Option<LineRange>,
}

impl CodeBlock {
    pub fn new(code: impl Into<String>, line_range: Option<LineRange>) -> Self {
        Self { code: code.into(), line_range }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.code.trim().is_empty()
    }

    /// Source line of the first line of `code`, used to map fragment-relative
    /// positions back to the file.
    pub fn first_line(&self) -> Option<usize> {
        self.line_range.map(|r| r.start)
    }
}

/// A described piece of code and the expectations it must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TestCase {
    /// Description lines joined with `\n`. Empty for a case that starts
    /// directly with code.
    pub description: String,
    pub code: CodeBlock,
    pub expectations: Vec<Expectation>,
    pub line_range: LineRange,
}

impl TestCase {
    /// A case without expectations never runs and never counts.
    pub fn is_skipped(&self) -> bool {
        self.expectations.is_empty()
    }

    pub fn first_expectation_line(&self) -> Option<usize> {
        self.expectations.first().map(|e| e.source_line)
    }

    /// Description for display; falls back to the first line of code.
    pub fn title(&self) -> &str {
        let desc = self.description.trim();
        if !desc.is_empty() {
            return desc.lines().next().unwrap_or(desc);
        }
        self.code
            .code
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .unwrap_or("unnamed test")
    }
}

/// The parse result for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TestRun {
    pub source_file: PathBuf,
    pub setup: CodeBlock,
    pub test_cases: Vec<TestCase>,
    pub teardown: CodeBlock,
    pub warnings: Vec<ParseWarning>,
}

impl TestRun {
    pub fn new(
        source_file: impl AsRef<Path>,
        setup: CodeBlock,
        test_cases: Vec<TestCase>,
        teardown: CodeBlock,
    ) -> Self {
        Self {
            source_file: source_file.as_ref().to_path_buf(),
            setup,
            test_cases,
            teardown,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<ParseWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Number of cases with at least one expectation.
    pub fn total_tests(&self) -> usize {
        self.test_cases.iter().filter(|tc| !tc.is_skipped()).count()
    }

    /// Cases that will execute, in file order.
    pub fn runnable_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases.iter().filter(|tc| !tc.is_skipped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectation::ExpectationKind;

    fn case(desc: &str, expectations: usize, line: usize) -> TestCase {
        TestCase {
            description: desc.to_string(),
            code: CodeBlock::new("x\n", Some(LineRange::single(line + 1))),
            expectations: (0..expectations)
                .map(|i| Expectation::new(ExpectationKind::Equality, "1", line + 2 + i))
                .collect(),
            line_range: LineRange::new(line, line + 1 + expectations),
        }
    }

    #[test]
    fn total_tests_skips_cases_without_expectations() {
        let run = TestRun::new(
            "t_try.rhai",
            CodeBlock::empty(),
            vec![case("a", 1, 0), case("b", 0, 4), case("c", 2, 8)],
            CodeBlock::empty(),
        );
        assert_eq!(run.total_tests(), 2);
        assert_eq!(run.runnable_cases().count(), 2);
    }

    #[test]
    fn first_expectation_line() {
        assert_eq!(case("a", 2, 4).first_expectation_line(), Some(6));
        assert_eq!(case("b", 0, 4).first_expectation_line(), None);
    }

    #[test]
    fn code_block_emptiness_ignores_whitespace() {
        assert!(CodeBlock::new("  \n\t\n", None).is_empty());
        assert!(!CodeBlock::new("x = 1\n", None).is_empty());
    }

    #[test]
    fn title_falls_back_to_code() {
        let mut tc = case("", 1, 0);
        tc.code = CodeBlock::new("# comment\n1 + 1\n", None);
        assert_eq!(tc.title(), "1 + 1");
        tc.description = "Adds\nnumbers".to_string();
        assert_eq!(tc.title(), "Adds");
    }
}
