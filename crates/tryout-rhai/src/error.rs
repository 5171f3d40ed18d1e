// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Converting rhai errors into engine outcomes, and the `error` value that
//! exception expectations see.

use std::fmt;

use rhai::{Dynamic, Engine, EvalAltResult, Position};
use tryout_engine::{ExecutionOutcome, NonLocal, RaisedError};

use crate::source::source_line;

/// Thrown by the registered `exit` function.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExitRequest(pub i32);

/// The value bound as `error` in exception expectations.
#[derive(Debug, Clone)]
pub struct CaughtError {
    pub kind: String,
    pub message: String,
    /// 1-based source line, or 0 when unknown.
    pub line: i64,
    /// The thrown value for `throw`, unit otherwise.
    pub value: Dynamic,
}

impl CaughtError {
    /// Kind plus every ancestor kind, most specific first.
    pub fn lineage(&self) -> Vec<&str> {
        let mut kinds = vec![self.kind.as_str()];
        let mut current = self.kind.as_str();
        while let Some(parent) = parent_kind(current) {
            kinds.push(parent);
            current = parent;
        }
        kinds
    }

    pub fn is_a(&self, kind: &str) -> bool {
        self.lineage().iter().any(|k| k.eq_ignore_ascii_case(kind))
    }
}

impl fmt::Display for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Error hierarchy. Everything descends from `Error`.
fn parent_kind(kind: &str) -> Option<&'static str> {
    match kind {
        "Error" => None,
        "ZeroDivisionError" => Some("ArithmeticError"),
        "VariableNotFound" | "FunctionNotFound" | "PropertyNotFound" => Some("NameError"),
        "IndexError" | "TypeError" => Some("RuntimeError"),
        _ => Some("Error"),
    }
}

pub(crate) fn register(engine: &mut Engine) {
    engine
        .register_type_with_name::<CaughtError>("Error")
        .register_get("kind", |e: &mut CaughtError| e.kind.clone())
        .register_get("message", |e: &mut CaughtError| e.message.clone())
        .register_get("line", |e: &mut CaughtError| e.line)
        .register_get("value", |e: &mut CaughtError| e.value.clone())
        .register_fn("is_a", |e: &mut CaughtError, kind: &str| e.is_a(kind))
        .register_fn("to_string", |e: &mut CaughtError| e.to_string())
        .register_fn("to_debug", |e: &mut CaughtError| format!("#<{}: {}>", e.kind, e.message));

    engine.register_fn("exit", |code: i64| -> Result<(), Box<EvalAltResult>> {
        Err(exit_request(code))
    });
    engine.register_fn("exit", || -> Result<(), Box<EvalAltResult>> { Err(exit_request(0)) });
}

fn exit_request(code: i64) -> Box<EvalAltResult> {
    let code = i32::try_from(code).unwrap_or(i32::MAX);
    EvalAltResult::ErrorRuntime(Dynamic::from(ExitRequest(code)), Position::NONE).into()
}

pub(crate) fn caught_error(err: &RaisedError<Dynamic>) -> CaughtError {
    CaughtError {
        kind: err.kind.clone(),
        message: err.message.clone(),
        line: err.line.map(|l| l as i64 + 1).unwrap_or(0),
        value: err.value.clone().unwrap_or(Dynamic::UNIT),
    }
}

/// Turn a rhai evaluation error into an outcome. `timed_out` says whether
/// the deadline callback stopped the script.
pub(crate) fn outcome_from_error(
    err: Box<EvalAltResult>,
    first_line: usize,
    timed_out: bool,
    timeout: Option<std::time::Duration>,
) -> ExecutionOutcome<Dynamic> {
    let mut trace = Vec::new();
    let mut call_site = Position::NONE;
    let mut err = *err;

    // Peel function-call wrappers, keeping them as trace frames.
    loop {
        match err {
            EvalAltResult::ErrorInFunctionCall(name, _, inner, pos)
            | EvalAltResult::ErrorInModule(name, inner, pos) => {
                if trace.is_empty() {
                    call_site = pos;
                }
                trace.push(frame(&name, first_line, pos));
                err = *inner;
            }
            other => {
                err = other;
                break;
            }
        }
    }
    // Innermost first.
    trace.reverse();

    // Some errors (arithmetic ones among them) come without a position. They
    // point at the outermost call in this fragment, or else at its first line.
    let line = source_line(first_line, err.position().line())
        .or_else(|| source_line(first_line, call_site.line()))
        .or(Some(first_line));
    let raised = |kind: &str, message: String, value: Option<Dynamic>| {
        let mut e = RaisedError::new(kind, message).at_line(line);
        e.trace = trace.clone();
        e.value = value;
        ExecutionOutcome::Raised(e)
    };

    match err {
        EvalAltResult::ErrorRuntime(value, _) => {
            if let Some(exit) = value.clone().try_cast::<ExitRequest>() {
                return ExecutionOutcome::NonLocalExit(NonLocal::Exit(exit.0));
            }
            let message = value.to_string();
            raised("RuntimeError", message, Some(value))
        }
        EvalAltResult::ErrorArithmetic(message, _) => {
            let kind = if message.to_lowercase().contains("by zero") {
                "ZeroDivisionError"
            } else {
                "ArithmeticError"
            };
            raised(kind, message, None)
        }
        EvalAltResult::ErrorVariableNotFound(name, _) => {
            raised("VariableNotFound", format!("variable not found: {}", name), None)
        }
        EvalAltResult::ErrorFunctionNotFound(sig, _) => {
            raised("FunctionNotFound", format!("function not found: {}", sig), None)
        }
        EvalAltResult::ErrorPropertyNotFound(name, _) => {
            raised("PropertyNotFound", format!("property not found: {}", name), None)
        }
        EvalAltResult::ErrorMismatchDataType(expected, actual, _) => {
            raised("TypeError", format!("expected {}, got {}", expected, actual), None)
        }
        EvalAltResult::ErrorArrayBounds(len, index, _) => raised(
            "IndexError",
            format!("array index {} out of bounds for length {}", index, len),
            None,
        ),
        EvalAltResult::ErrorStackOverflow(_) => ExecutionOutcome::NonLocalExit(NonLocal::StackOverflow),
        EvalAltResult::ErrorTerminated(_, _) if timed_out => {
            ExecutionOutcome::TimedOut(timeout.unwrap_or_default())
        }
        EvalAltResult::ErrorTerminated(token, _) => {
            ExecutionOutcome::NonLocalExit(NonLocal::Terminated(token.to_string()))
        }
        EvalAltResult::ErrorTooManyOperations(_) => {
            ExecutionOutcome::NonLocalExit(NonLocal::Terminated("too many operations".to_string()))
        }
        other => {
            let message = strip_position(&other.to_string());
            raised("RuntimeError", message, None)
        }
    }
}

/// A compile error in a fragment.
pub(crate) fn outcome_from_parse_error(err: &rhai::ParseError, first_line: usize) -> ExecutionOutcome<Dynamic> {
    let line = source_line(first_line, err.position().line());
    ExecutionOutcome::Raised(RaisedError::new("SyntaxError", err.err_type().to_string()).at_line(line))
}

fn frame(name: &str, first_line: usize, pos: Position) -> String {
    match source_line(first_line, pos.line()) {
        Some(line) => format!("{} @ line {}", name, line + 1),
        None => name.to_string(),
    }
}

/// rhai appends ` (line L, position P)` to messages; the engine tracks lines itself.
fn strip_position(message: &str) -> String {
    match message.rfind(" (line ") {
        Some(idx) if message.ends_with(')') => message[..idx].to_string(),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caught(kind: &str) -> CaughtError {
        CaughtError { kind: kind.into(), message: "m".into(), line: 1, value: Dynamic::UNIT }
    }

    #[test]
    fn lineage_walks_to_error() {
        assert_eq!(caught("ZeroDivisionError").lineage(), vec!["ZeroDivisionError", "ArithmeticError", "Error"]);
        assert!(caught("ZeroDivisionError").is_a("ArithmeticError"));
        assert!(caught("VariableNotFound").is_a("NameError"));
        assert!(!caught("VariableNotFound").is_a("ArithmeticError"));
        assert!(caught("Custom").is_a("error"));
    }

    #[test]
    fn position_suffix_removed() {
        assert_eq!(strip_position("Oops (line 2, position 5)"), "Oops");
        assert_eq!(strip_position("plain"), "plain");
    }
}
