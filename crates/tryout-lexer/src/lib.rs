// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Line classifier for tryout files.
//!
//! Splits source text into physical lines and tags each one as a
//! description, expectation, comment, blank, or code line.

mod lexer;

pub use lexer::{classify, classify_line, ClassifiedLine, ExpectationMarker, LineKind};
