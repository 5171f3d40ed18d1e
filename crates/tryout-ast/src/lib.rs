// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Test-run model for tryout files.
//!
//! This crate defines the immutable structures produced by the parser and
//! consumed by the execution engine, reporters, and translators. Nothing here
//! executes code.

pub mod span;
pub mod expectation;
pub mod testrun;
pub mod select;
pub mod warning;

pub use expectation::{Expectation, ExpectationKind};
pub use select::LineSpec;
pub use span::LineRange;
pub use testrun::{CodeBlock, TestCase, TestRun};
pub use warning::ParseWarning;
