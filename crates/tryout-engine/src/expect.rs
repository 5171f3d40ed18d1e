// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pass/fail rules for each expectation kind.

use std::time::Duration;

use regex::Regex;
use tryout_ast::{Expectation, ExpectationKind};

use crate::eval::{guarded, Evaluator, ExecutionOutcome, Fragment, RaisedError};
use crate::ledger::ExpectationOutcome;
use crate::pattern::regex_literal;

/// Performance limits get this much slack.
const PERFORMANCE_TOLERANCE: f64 = 1.1;

/// Everything a case run left for its expectations to look at.
pub(crate) struct Observation<'a, V> {
    pub outcome: &'a ExecutionOutcome<V>,
    pub stdout: &'a str,
    pub stderr: &'a str,
    pub elapsed: Duration,
}

/// Evaluate one expectation against an observed case run.
pub(crate) fn check<'r, E: Evaluator>(
    ev: &E,
    ctx: &E::Context,
    obs: &Observation<'_, E::Value>,
    exp: &'r Expectation,
) -> ExpectationOutcome<'r> {
    let checker = Checker { ev, ctx, obs, exp };
    let verdict = match exp.kind {
        ExpectationKind::Exception => checker.exception(),
        _ => match obs.outcome {
            ExecutionOutcome::Completed(value) => checker.completed(value),
            ExecutionOutcome::Raised(err) => Verdict::fail(
                checker.expected_text(),
                format!("({}) {}", err.kind, err.message),
            ),
            ExecutionOutcome::NonLocalExit(n) => Verdict::fail(checker.expected_text(), n.to_string()),
            ExecutionOutcome::TimedOut(d) => {
                Verdict::fail(checker.expected_text(), format!("timed out after {}ms", d.as_millis()))
            }
        },
    };
    tracing::trace!(
        line = exp.source_line + 1,
        kind = %exp.kind,
        passed = verdict.passed,
        "expectation"
    );
    ExpectationOutcome {
        expectation: exp,
        passed: verdict.passed,
        expected: verdict.expected,
        actual: verdict.actual,
        detail: verdict.detail,
    }
}

struct Verdict {
    passed: bool,
    expected: String,
    actual: String,
    detail: Option<String>,
}

impl Verdict {
    fn new(passed: bool, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self { passed, expected: expected.into(), actual: actual.into(), detail: None }
    }

    fn fail(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(false, expected, actual)
    }

    /// The expectation itself could not be evaluated.
    fn broken(expected: impl Into<String>, actual: impl Into<String>, detail: String) -> Self {
        Self { passed: false, expected: expected.into(), actual: actual.into(), detail: Some(detail) }
    }
}

struct Checker<'a, 'o, E: Evaluator> {
    ev: &'a E,
    ctx: &'a E::Context,
    obs: &'a Observation<'o, E::Value>,
    exp: &'a Expectation,
}

impl<E: Evaluator> Checker<'_, '_, E> {
    fn expected_text(&self) -> String {
        match self.exp.kind {
            ExpectationKind::NonNil => "non-nil result".to_string(),
            _ => self.exp.payload.clone(),
        }
    }

    /// Evaluate the payload in a scratch copy of the context.
    fn eval_payload(&self, bindings: &[(&str, E::Value)]) -> Result<E::Value, String> {
        let mut scratch = self.ctx.clone();
        for (name, value) in bindings {
            self.ev.bind(&mut scratch, name, value.clone());
        }
        let fragment = Fragment::new(&self.exp.payload, self.exp.source_line);
        match guarded(|| self.ev.evaluate(&mut scratch, &fragment)) {
            ExecutionOutcome::Completed(v) => Ok(v),
            ExecutionOutcome::Raised(err) => {
                Err(format!("expectation raised ({}) {}", err.kind, err.message))
            }
            ExecutionOutcome::NonLocalExit(n) => Err(format!("expectation exited: {}", n)),
            ExecutionOutcome::TimedOut(d) => {
                Err(format!("expectation timed out after {}ms", d.as_millis()))
            }
        }
    }

    fn result_bindings(&self, value: &E::Value) -> Vec<(&'static str, E::Value)> {
        vec![("result", value.clone()), ("_", value.clone())]
    }

    fn completed(&self, value: &E::Value) -> Verdict {
        let actual = self.ev.inspect(value);
        match self.exp.kind {
            ExpectationKind::Equality => self.equality(value),
            ExpectationKind::Inverted => {
                let inner = self.equality(value);
                if inner.detail.is_some() {
                    return inner;
                }
                Verdict::new(!inner.passed, format!("NOT {}", inner.expected), inner.actual)
            }
            ExpectationKind::TypeCheck => {
                let name = self.exp.payload.trim();
                Verdict::new(self.ev.type_matches(value, name), name, self.ev.type_name(value))
            }
            ExpectationKind::RegexMatch => {
                let text = self.ev.to_text(value);
                match self.pattern(value) {
                    Ok(re) => Verdict::new(re.is_match(&text), format!("/{}/", re.as_str()), text),
                    Err(detail) => Verdict::broken(self.exp.payload.clone(), text, detail),
                }
            }
            ExpectationKind::PredicateTrue => self.predicate(value, Some(true), "true"),
            ExpectationKind::PredicateFalse => self.predicate(value, Some(false), "false (exactly)"),
            ExpectationKind::PredicateBoolean => self.predicate(value, None, "true or false"),
            ExpectationKind::StdoutContains => self.output(value, "stdout", self.obs.stdout),
            ExpectationKind::StderrContains => self.output(value, "stderr", self.obs.stderr),
            ExpectationKind::Performance => self.performance(value),
            ExpectationKind::NonNil => Verdict::new(!self.ev.is_nil(value), self.expected_text(), actual),
            // Handled before the outcome is inspected.
            ExpectationKind::Exception => self.exception(),
        }
    }

    fn equality(&self, value: &E::Value) -> Verdict {
        let actual = self.ev.inspect(value);
        match self.eval_payload(&self.result_bindings(value)) {
            Ok(expected) => Verdict::new(
                self.ev.values_equal(value, &expected),
                self.ev.inspect(&expected),
                actual,
            ),
            Err(detail) => Verdict::broken(self.exp.payload.clone(), actual, detail),
        }
    }

    /// `want` is the exact boolean required, or None for either.
    fn predicate(&self, value: &E::Value, want: Option<bool>, expected: &str) -> Verdict {
        match self.eval_payload(&self.result_bindings(value)) {
            Ok(got) => {
                let passed = match (self.ev.as_bool(&got), want) {
                    (Some(b), Some(w)) => b == w,
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                Verdict::new(passed, expected, self.ev.inspect(&got))
            }
            Err(detail) => Verdict::broken(expected, self.ev.inspect(value), detail),
        }
    }

    fn pattern(&self, value: &E::Value) -> Result<Regex, String> {
        if let Some(literal) = regex_literal(&self.exp.payload) {
            return literal.map_err(|e| format!("invalid regex: {}", e));
        }
        let source = self.eval_payload(&self.result_bindings(value))?;
        Regex::new(&self.ev.to_text(&source)).map_err(|e| format!("invalid regex: {}", e))
    }

    fn output(&self, value: &E::Value, stream: &str, captured: &str) -> Verdict {
        let actual = format!("{}: {:?}", stream, captured);
        if let Some(literal) = regex_literal(&self.exp.payload) {
            return match literal {
                Ok(re) => Verdict::new(re.is_match(captured), format!("/{}/", re.as_str()), actual),
                Err(e) => Verdict::broken(self.exp.payload.clone(), actual, format!("invalid regex: {}", e)),
            };
        }
        match self.eval_payload(&self.result_bindings(value)) {
            Ok(needle) => {
                let needle = self.ev.to_text(&needle);
                Verdict::new(captured.contains(&needle), format!("{:?}", needle), actual)
            }
            Err(detail) => Verdict::broken(self.exp.payload.clone(), actual, detail),
        }
    }

    fn performance(&self, value: &E::Value) -> Verdict {
        let elapsed_ms = self.obs.elapsed.as_secs_f64() * 1000.0;
        let mut bindings = self.result_bindings(value);
        bindings.push(("elapsed_ms", self.ev.number(elapsed_ms)));
        let actual = format!("{:.3}ms", elapsed_ms);
        match self.eval_payload(&bindings) {
            Ok(got) => {
                if let Some(b) = self.ev.as_bool(&got) {
                    Verdict::new(b, self.exp.payload.clone(), actual)
                } else if let Some(limit) = self.ev.as_number(&got) {
                    let passed = elapsed_ms <= limit * PERFORMANCE_TOLERANCE;
                    Verdict::new(passed, format!("<= {}ms", limit), actual)
                } else {
                    Verdict::broken(
                        self.exp.payload.clone(),
                        actual,
                        format!("expected a millisecond limit or a boolean, got {}", self.ev.type_name(&got)),
                    )
                }
            }
            Err(detail) => Verdict::broken(self.exp.payload.clone(), actual, detail),
        }
    }

    fn exception(&self) -> Verdict {
        match self.obs.outcome {
            ExecutionOutcome::Raised(err) => self.caught(err),
            ExecutionOutcome::Completed(value) => Verdict::fail(
                self.exp.payload.clone(),
                format!("no exception was raised (result: {})", self.ev.inspect(value)),
            ),
            ExecutionOutcome::NonLocalExit(n) => Verdict::fail(self.exp.payload.clone(), n.to_string()),
            ExecutionOutcome::TimedOut(d) => {
                Verdict::fail(self.exp.payload.clone(), format!("timed out after {}ms", d.as_millis()))
            }
        }
    }

    fn caught(&self, err: &RaisedError<E::Value>) -> Verdict {
        let error = self.ev.error_value(err);
        let actual = format!("({}) {}", err.kind, err.message);
        let bindings = [("error", error.clone()), ("result", error.clone()), ("_", error)];
        match self.eval_payload(&bindings) {
            Ok(got) => Verdict::new(self.ev.is_truthy(&got), self.exp.payload.clone(), actual),
            Err(detail) => Verdict::broken(self.exp.payload.clone(), actual, detail),
        }
    }
}
