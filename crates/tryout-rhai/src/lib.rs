// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rhai backend for the tryout engine.
//!
//! Fragments run in a persistent rhai [`rhai::Scope`]; functions they define
//! stay callable in later fragments. `print` goes to stdout, `debug` and
//! `eprint` to stderr, and `exit(n)` leaves the fragment non-locally.

mod error;
mod evaluator;
mod output;
mod source;
mod types;

pub use error::CaughtError;
pub use evaluator::{RhaiConfig, RhaiContext, RhaiEvaluator};
