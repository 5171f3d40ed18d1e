// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parse errors. Any of these aborts parsing before execution.

use std::path::PathBuf;

use thiserror::Error;

/// Line numbers are 0-based; messages print them 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {}: test `{description}` has no expectation before the next test or end of file", .line + 1)]
    MissingExpectation { line: usize, description: String },

    #[error("line {}: code after a test's expectations is not followed by an expectation", .line + 1)]
    StrayCode { line: usize },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
