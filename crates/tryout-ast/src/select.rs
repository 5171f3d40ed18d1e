// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Selecting test cases by source line.

use std::fmt;

use crate::testrun::{TestCase, TestRun};

/// A user-supplied line selection. Lines are 1-based, as typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSpec {
    Line(usize),
    Range(usize, usize),
}

impl LineSpec {
    /// Parse `19`, `19-45`, `L19`, `L19-45`, or `L19-L45`.
    /// Returns None for anything else, including zero or inverted ranges.
    pub fn parse(spec: &str) -> Option<LineSpec> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        match spec.split_once('-') {
            Some((a, b)) => {
                let start = parse_line_number(a)?;
                let end = parse_line_number(b)?;
                if start > end {
                    return None;
                }
                Some(LineSpec::Range(start, end))
            }
            None => parse_line_number(spec).map(LineSpec::Line),
        }
    }

    /// Whether a case's 0-based range contains the line or overlaps the range.
    pub fn matches(&self, case: &TestCase) -> bool {
        let range = case.line_range;
        match *self {
            LineSpec::Line(n) => range.contains(n - 1),
            LineSpec::Range(a, b) => !(range.end < a - 1 || b - 1 < range.start),
        }
    }
}

fn parse_line_number(s: &str) -> Option<usize> {
    let s = s.strip_prefix(&['L', 'l'][..]).unwrap_or(s);
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

impl fmt::Display for LineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSpec::Line(n) => write!(f, "{}", n),
            LineSpec::Range(a, b) => write!(f, "{}-{}", a, b),
        }
    }
}

impl TestRun {
    /// Keep setup and teardown, drop every case the selection does not match.
    pub fn select(&self, spec: &LineSpec) -> TestRun {
        TestRun {
            source_file: self.source_file.clone(),
            setup: self.setup.clone(),
            test_cases: self.test_cases.iter().filter(|tc| spec.matches(tc)).cloned().collect(),
            teardown: self.teardown.clone(),
            warnings: self.warnings.clone(),
        }
    }
}
