// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Reporting for tryout runs.
//!
//! [`Formatter`] renders ledgers for terminals, [`json`] renders them for
//! machines, and [`RunSummary`] folds every file's outcome into the process
//! [`ExitStatus`].

pub mod formatter;
pub mod json;
pub mod style;
pub mod summary;

pub use formatter::{FormatOptions, Formatter};
pub use json::{FileReport, RunReport};
pub use summary::{ExitStatus, RunSummary};
