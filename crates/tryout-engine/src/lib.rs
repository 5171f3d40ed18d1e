// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Execution engine for tryout files.
//!
//! A [`TestBatch`] runs a parsed [`tryout_ast::TestRun`] through an injected
//! [`Evaluator`], checks every expectation of every case, and records the
//! verdicts in a [`ResultLedger`]. One misbehaving case never stops the
//! cases after it.

mod batch;
mod eval;
mod expect;
mod ledger;
mod pattern;

pub use batch::{ContextMode, EngineConfig, TestBatch};
pub use eval::{
    guarded, CapturedOutput, Evaluator, ExecutionOutcome, Fragment, NoCapture, NonLocal, OutputCapture,
    RaisedError,
};
pub use ledger::{CaseError, ExpectationOutcome, PhaseError, PhaseOutcome, ResultLedger, TestResult};
pub use pattern::regex_literal;
