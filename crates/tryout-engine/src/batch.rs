// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Running a parsed test run: setup, every case, teardown.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tryout_ast::{CodeBlock, TestCase, TestRun};

use crate::eval::{guarded, CapturedOutput, Evaluator, ExecutionOutcome, Fragment, OutputCapture};
use crate::expect::{check, Observation};
use crate::ledger::{CaseError, PhaseError, PhaseOutcome, ResultLedger, TestResult};

/// How cases share bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextMode {
    /// One context for setup, every case and teardown, in file order.
    #[default]
    Shared,
    /// Each case (and teardown) gets a copy of the bindings setup left.
    Fresh,
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextMode::Shared => f.write_str("shared"),
            ContextMode::Fresh => f.write_str("fresh"),
        }
    }
}

impl FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(ContextMode::Shared),
            "fresh" => Ok(ContextMode::Fresh),
            other => Err(format!("unknown context mode `{}` (expected shared or fresh)", other)),
        }
    }
}

/// Engine settings fixed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Log fragment sources and verdicts at info level.
    pub debug: bool,
    /// Keep error traces in case errors.
    pub stack_traces: bool,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Setup,
    Teardown,
}

/// One execution of one test run.
pub struct TestBatch<'r, 'e, E: Evaluator> {
    run: &'r TestRun,
    mode: ContextMode,
    evaluator: &'e E,
    capture: &'e dyn OutputCapture,
    config: EngineConfig,
    ledger: ResultLedger<'r, E::Value>,
}

impl<'r, 'e, E: Evaluator> TestBatch<'r, 'e, E> {
    pub fn new(
        run: &'r TestRun,
        mode: ContextMode,
        evaluator: &'e E,
        capture: &'e dyn OutputCapture,
        config: EngineConfig,
    ) -> Self {
        Self { run, mode, evaluator, capture, config, ledger: ResultLedger::default() }
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    pub fn ledger(&self) -> &ResultLedger<'r, E::Value> {
        &self.ledger
    }

    pub fn into_ledger(self) -> ResultLedger<'r, E::Value> {
        self.ledger
    }

    pub fn run(&mut self) -> bool {
        self.run_with(|_| {})
    }

    /// Run everything, calling `on_result` after each case. Returns the
    /// overall verdict. Running again starts from a fresh ledger.
    pub fn run_with<F>(&mut self, mut on_result: F) -> bool
    where
        F: FnMut(&TestResult<'r, E::Value>),
    {
        let run = self.run;
        self.ledger = ResultLedger::default();
        let span = tracing::debug_span!("batch", file = %run.source_file.display(), mode = %self.mode);
        let _enter = span.enter();

        let mut base = self.evaluator.create_context();
        if !run.setup.is_empty() {
            let outcome = self.run_phase(&mut base, &run.setup, Phase::Setup);
            let failed = outcome.failed();
            self.ledger.setup = Some(outcome);
            if failed {
                tracing::debug!("setup failed; skipping cases and teardown");
                return false;
            }
        }

        // Fresh mode copies the bindings setup left, once.
        let snapshot = match self.mode {
            ContextMode::Fresh => Some(base.clone()),
            ContextMode::Shared => None,
        };

        for case in run.runnable_cases() {
            let result = match &snapshot {
                Some(seed) => {
                    let mut ctx = seed.clone();
                    self.run_case(&mut ctx, case)
                }
                None => self.run_case(&mut base, case),
            };
            on_result(&result);
            self.ledger.results.push(result);
        }

        if !run.teardown.is_empty() {
            let mut ctx = match &snapshot {
                Some(seed) => seed.clone(),
                None => base,
            };
            let outcome = self.run_phase(&mut ctx, &run.teardown, Phase::Teardown);
            self.ledger.teardown = Some(outcome);
        }

        let success = self.ledger.success();
        tracing::debug!(
            size = self.ledger.size(),
            failed = self.ledger.failed(),
            success,
            "batch finished"
        );
        success
    }

    /// Evaluate one fragment with output capture around it.
    fn execute(
        &self,
        ctx: &mut E::Context,
        fragment: &Fragment<'_>,
    ) -> (ExecutionOutcome<E::Value>, CapturedOutput, Duration) {
        if self.config.debug {
            tracing::info!(line = fragment.first_line + 1, code = fragment.code, "evaluating");
        }
        self.capture.begin();
        let start = Instant::now();
        let outcome = guarded(|| self.evaluator.evaluate(ctx, fragment));
        let elapsed = start.elapsed();
        let output = self.capture.finish();
        (outcome, output, elapsed)
    }

    fn run_phase(&self, ctx: &mut E::Context, block: &CodeBlock, phase: Phase) -> PhaseOutcome {
        let fragment = Fragment::new(&block.code, block.first_line().unwrap_or(0));
        let (outcome, output, elapsed) = self.execute(ctx, &fragment);
        let error = CaseError::from_outcome(&outcome, self.config.stack_traces).map(|e| match phase {
            Phase::Setup => PhaseError::Setup(e),
            Phase::Teardown => PhaseError::Teardown(e),
        });
        match &error {
            Some(e) => tracing::debug!(?phase, error = %e, "phase failed"),
            None => tracing::debug!(?phase, elapsed_ms = elapsed.as_millis() as u64, "phase complete"),
        }
        PhaseOutcome { stdout: output.stdout, stderr: output.stderr, error, elapsed }
    }

    fn run_case(&self, ctx: &mut E::Context, case: &'r TestCase) -> TestResult<'r, E::Value> {
        let first_line = case
            .code
            .first_line()
            .or_else(|| case.first_expectation_line())
            .unwrap_or(case.line_range.start);
        let fragment = Fragment::new(&case.code.code, first_line);
        let (outcome, output, elapsed) = self.execute(ctx, &fragment);

        let observation = Observation {
            outcome: &outcome,
            stdout: &output.stdout,
            stderr: &output.stderr,
            elapsed,
        };
        // Every expectation runs, even after one fails.
        let expectations: Vec<_> = case
            .expectations
            .iter()
            .map(|exp| check(self.evaluator, ctx, &observation, exp))
            .collect();
        let success = !expectations.is_empty() && expectations.iter().all(|e| e.passed);

        let error = CaseError::from_outcome(&outcome, self.config.stack_traces);
        let value_repr = outcome.value().map(|v| self.evaluator.inspect(v));
        let value = match outcome {
            ExecutionOutcome::Completed(v) => Some(v),
            _ => None,
        };

        if self.config.debug {
            tracing::info!(line = %case.line_range, title = case.title(), success, "case");
        } else {
            tracing::debug!(line = %case.line_range, success, "case");
        }

        TestResult {
            test_case: case,
            success,
            value,
            value_repr,
            stdout: output.stdout,
            stderr: output.stderr,
            error,
            expectations,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_mode_parses() {
        assert_eq!("shared".parse::<ContextMode>(), Ok(ContextMode::Shared));
        assert_eq!("fresh".parse::<ContextMode>(), Ok(ContextMode::Fresh));
        assert!("other".parse::<ContextMode>().is_err());
        assert_eq!(ContextMode::default(), ContextMode::Shared);
        assert_eq!(ContextMode::Fresh.to_string(), "fresh");
    }
}
