// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The evaluation capability the engine drives.
//!
//! The engine never interprets code itself. An [`Evaluator`] runs fragments
//! in an opaque context and answers questions about the values it produced;
//! an [`OutputCapture`] collects what those fragments print.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// A piece of source handed to the evaluator.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub code: &'a str,
    /// 0-based source line of the fragment's first line.
    pub first_line: usize,
}

impl<'a> Fragment<'a> {
    pub fn new(code: &'a str, first_line: usize) -> Self {
        Self { code, first_line }
    }
}

/// An error raised by a fragment, as reported by the evaluator.
#[derive(Debug, Clone)]
pub struct RaisedError<V> {
    /// Error class, e.g. `ArithmeticError`.
    pub kind: String,
    pub message: String,
    /// 0-based source line, when the evaluator knows it.
    pub line: Option<usize>,
    /// Frames from innermost outward.
    pub trace: Vec<String>,
    /// Value thrown by user code, if any.
    pub value: Option<V>,
}

impl<V> RaisedError<V> {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into(), line: None, trace: Vec::new(), value: None }
    }

    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

/// Control transfers that leave a fragment without a value or an ordinary error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonLocal {
    /// The fragment asked the process to exit.
    Exit(i32),
    /// Host-side panic caught at the fragment boundary.
    Panic(String),
    StackOverflow,
    /// Evaluation was stopped for a reason other than the deadline.
    Terminated(String),
}

impl fmt::Display for NonLocal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonLocal::Exit(code) => write!(f, "exit({})", code),
            NonLocal::Panic(msg) => write!(f, "panic: {}", msg),
            NonLocal::StackOverflow => write!(f, "stack overflow"),
            NonLocal::Terminated(msg) => write!(f, "terminated: {}", msg),
        }
    }
}

/// What happened when a fragment ran.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome<V> {
    Completed(V),
    Raised(RaisedError<V>),
    NonLocalExit(NonLocal),
    TimedOut(Duration),
}

impl<V> ExecutionOutcome<V> {
    pub fn value(&self) -> Option<&V> {
        match self {
            ExecutionOutcome::Completed(v) => Some(v),
            _ => None,
        }
    }

    pub fn raised(&self) -> Option<&RaisedError<V>> {
        match self {
            ExecutionOutcome::Raised(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed(_))
    }
}

/// Captured standard streams of one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Redirects what fragments print. `begin` and `finish` bracket one fragment.
pub trait OutputCapture {
    fn begin(&self);
    fn finish(&self) -> CapturedOutput;
}

/// Captures nothing; fragments print wherever the evaluator sends them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl OutputCapture for NoCapture {
    fn begin(&self) {}

    fn finish(&self) -> CapturedOutput {
        CapturedOutput::default()
    }
}

/// A code-evaluation backend.
pub trait Evaluator {
    type Value: Clone + fmt::Debug;
    /// Cloning a context copies its bindings.
    type Context: Clone;

    fn create_context(&self) -> Self::Context;

    fn evaluate(&self, ctx: &mut Self::Context, fragment: &Fragment<'_>) -> ExecutionOutcome<Self::Value>;

    fn bind(&self, ctx: &mut Self::Context, name: &str, value: Self::Value);

    // === Value operations ===

    /// Structural equality.
    fn values_equal(&self, a: &Self::Value, b: &Self::Value) -> bool;

    /// Whether `value` is of the named type or one of its descendants.
    fn type_matches(&self, value: &Self::Value, type_name: &str) -> bool;

    fn type_name(&self, value: &Self::Value) -> String;

    /// String form used for regex matching.
    fn to_text(&self, value: &Self::Value) -> String;

    /// Debug form used in failure reports.
    fn inspect(&self, value: &Self::Value) -> String;

    /// Some only for actual booleans.
    fn as_bool(&self, value: &Self::Value) -> Option<bool>;

    fn is_truthy(&self, value: &Self::Value) -> bool;

    fn is_nil(&self, value: &Self::Value) -> bool;

    fn as_number(&self, value: &Self::Value) -> Option<f64>;

    /// The value bound as `error` for exception expectations.
    fn error_value(&self, error: &RaisedError<Self::Value>) -> Self::Value;

    fn number(&self, n: f64) -> Self::Value;
}

/// Run `f`, turning a host panic into `NonLocal::Panic`.
pub fn guarded<V>(f: impl FnOnce() -> ExecutionOutcome<V>) -> ExecutionOutcome<V> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            ExecutionOutcome::NonLocalExit(NonLocal::Panic(msg))
        }
    }
}
