// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Per-case results and the ledger that collects them.

use std::time::Duration;

use thiserror::Error;
use tryout_ast::{Expectation, TestCase};

use crate::eval::{ExecutionOutcome, NonLocal, RaisedError};

/// Why a fragment did not complete normally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    #[error("{kind}: {message}")]
    Raised {
        kind: String,
        message: String,
        line: Option<usize>,
        trace: Vec<String>,
    },
    #[error("non-local exit: {0}")]
    NonLocalExit(NonLocal),
    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
}

impl CaseError {
    pub(crate) fn from_raised<V>(err: &RaisedError<V>, stack_traces: bool) -> Self {
        CaseError::Raised {
            kind: err.kind.clone(),
            message: err.message.clone(),
            line: err.line,
            trace: if stack_traces { err.trace.clone() } else { Vec::new() },
        }
    }

    /// None for a completed fragment.
    pub(crate) fn from_outcome<V>(outcome: &ExecutionOutcome<V>, stack_traces: bool) -> Option<Self> {
        match outcome {
            ExecutionOutcome::Completed(_) => None,
            ExecutionOutcome::Raised(err) => Some(Self::from_raised(err, stack_traces)),
            ExecutionOutcome::NonLocalExit(n) => Some(CaseError::NonLocalExit(n.clone())),
            ExecutionOutcome::TimedOut(d) => Some(CaseError::TimedOut(*d)),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            CaseError::Raised { kind, .. } => kind,
            CaseError::NonLocalExit(_) => "NonLocalExit",
            CaseError::TimedOut(_) => "Timeout",
        }
    }

    pub fn trace(&self) -> &[String] {
        match self {
            CaseError::Raised { trace, .. } => trace,
            _ => &[],
        }
    }
}

/// Failure of the setup or teardown block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("setup failed: {0}")]
    Setup(CaseError),
    #[error("teardown failed: {0}")]
    Teardown(CaseError),
}

impl PhaseError {
    pub fn cause(&self) -> &CaseError {
        match self {
            PhaseError::Setup(e) | PhaseError::Teardown(e) => e,
        }
    }
}

/// What one setup or teardown evaluation left behind.
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<PhaseError>,
    pub elapsed: Duration,
}

impl PhaseOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Verdict for one expectation.
#[derive(Debug, Clone)]
pub struct ExpectationOutcome<'r> {
    pub expectation: &'r Expectation,
    pub passed: bool,
    /// Rendering of what the expectation wanted.
    pub expected: String,
    /// Rendering of what was observed.
    pub actual: String,
    /// Why evaluation of the expectation itself went wrong, if it did.
    pub detail: Option<String>,
}

/// Result of running one test case.
#[derive(Debug, Clone)]
pub struct TestResult<'r, V> {
    pub test_case: &'r TestCase,
    pub success: bool,
    pub value: Option<V>,
    pub value_repr: Option<String>,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<CaseError>,
    pub expectations: Vec<ExpectationOutcome<'r>>,
    pub elapsed: Duration,
}

impl<'r, V> TestResult<'r, V> {
    pub fn failed_expectations(&self) -> impl Iterator<Item = &ExpectationOutcome<'r>> {
        self.expectations.iter().filter(|e| !e.passed)
    }
}

/// Everything one batch run produced, in file order.
#[derive(Debug, Clone)]
pub struct ResultLedger<'r, V> {
    pub results: Vec<TestResult<'r, V>>,
    /// None when there was no setup block.
    pub setup: Option<PhaseOutcome>,
    /// None when there was no teardown block or it never ran.
    pub teardown: Option<PhaseOutcome>,
}

impl<'r, V> Default for ResultLedger<'r, V> {
    fn default() -> Self {
        Self { results: Vec::new(), setup: None, teardown: None }
    }
}

impl<'r, V> ResultLedger<'r, V> {
    /// Number of evaluated cases.
    pub fn size(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    pub fn passed(&self) -> usize {
        self.size() - self.failed()
    }

    pub fn setup_failed(&self) -> bool {
        self.setup.as_ref().is_some_and(PhaseOutcome::failed)
    }

    pub fn teardown_failed(&self) -> bool {
        self.teardown.as_ref().is_some_and(PhaseOutcome::failed)
    }

    pub fn setup_error(&self) -> Option<&PhaseError> {
        self.setup.as_ref().and_then(|p| p.error.as_ref())
    }

    pub fn teardown_error(&self) -> Option<&PhaseError> {
        self.teardown.as_ref().and_then(|p| p.error.as_ref())
    }

    /// The overall verdict of the run.
    pub fn success(&self) -> bool {
        !self.setup_failed() && !self.teardown_failed() && self.failed() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestResult<'r, V>> {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ledger_succeeds() {
        let ledger: ResultLedger<'_, ()> = ResultLedger::default();
        assert_eq!(ledger.size(), 0);
        assert!(ledger.success());
    }

    #[test]
    fn setup_failure_fails_the_run() {
        let mut ledger: ResultLedger<'_, ()> = ResultLedger::default();
        let cause = CaseError::Raised {
            kind: "RuntimeError".into(),
            message: "bad".into(),
            line: Some(0),
            trace: vec![],
        };
        ledger.setup = Some(PhaseOutcome { error: Some(PhaseError::Setup(cause)), ..Default::default() });
        assert!(ledger.setup_failed());
        assert!(!ledger.success());
        assert_eq!(
            ledger.setup_error().map(|e| e.to_string()),
            Some("setup failed: RuntimeError: bad".to_string())
        );
    }

    #[test]
    fn case_error_from_outcome() {
        let outcome: ExecutionOutcome<()> = ExecutionOutcome::TimedOut(Duration::from_millis(250));
        assert_eq!(
            CaseError::from_outcome(&outcome, false).map(|e| e.to_string()),
            Some("timed out after 250ms".to_string())
        );
        let mut raised = RaisedError::<()>::new("ArithmeticError", "Division by zero");
        raised.trace = vec!["f @ 3".into()];
        let err = CaseError::from_raised(&raised, false);
        assert!(err.trace().is_empty());
        assert_eq!(CaseError::from_raised(&raised, true).trace().len(), 1);
    }
}
