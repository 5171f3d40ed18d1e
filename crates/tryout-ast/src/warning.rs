// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Non-fatal findings recorded while parsing.

use std::fmt;

/// A parse warning. The line was kept as an ordinary comment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ParseWarning {
    /// `#=something>` that is not a known marker.
    MalformedExpectation { line: usize, syntax: String },
    /// `#=N>` with a pipe other than 1 (stdout) or 2 (stderr).
    UnsupportedPipe { line: usize, pipe: u32 },
    /// Text after a marker that takes no payload.
    PayloadIgnored { line: usize, marker: &'static str },
    /// A test case with no `##` description line.
    UnnamedTest { line: usize },
}

impl ParseWarning {
    /// 0-based source line.
    pub fn line(&self) -> usize {
        match self {
            ParseWarning::MalformedExpectation { line, .. }
            | ParseWarning::UnsupportedPipe { line, .. }
            | ParseWarning::PayloadIgnored { line, .. }
            | ParseWarning::UnnamedTest { line } => *line,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::MalformedExpectation { line, syntax } => write!(
                f,
                "line {}: unknown expectation syntax `#={}>`; treated as a comment",
                line + 1,
                syntax
            ),
            ParseWarning::UnsupportedPipe { line, pipe } => write!(
                f,
                "line {}: output pipe {} is not supported (use 1 for stdout, 2 for stderr)",
                line + 1,
                pipe
            ),
            ParseWarning::PayloadIgnored { line, marker } => {
                write!(f, "line {}: `{}` takes no payload; trailing text ignored", line + 1, marker)
            }
            ParseWarning::UnnamedTest { line } => {
                write!(f, "line {}: test has no `##` description", line + 1)
            }
        }
    }
}
