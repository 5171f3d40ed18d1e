// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expectation kinds and decoded expectations.

use std::fmt;

/// What an expectation line asserts about a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExpectationKind {
    /// `#=>` produced value equals the evaluated payload
    Equality,
    /// `#=:>` produced value is of the named type (or a descendant)
    TypeCheck,
    /// `#=~>` string form of the produced value matches a regex
    RegexMatch,
    /// `#==>` payload evaluates to true
    PredicateTrue,
    /// `#=/=>` payload evaluates to false
    PredicateFalse,
    /// `#=|>` payload evaluates to a boolean
    PredicateBoolean,
    /// `#=!>` fragment raises and the payload holds for the caught error
    Exception,
    /// `#=<>` the equality comparison must fail
    Inverted,
    /// `#=1>` captured stdout contains or matches the payload
    StdoutContains,
    /// `#=2>` captured stderr contains or matches the payload
    StderrContains,
    /// `#=%>` timing/behavioral assertion with `elapsed_ms` in scope
    Performance,
    /// `#=*>` produced value is not nil
    NonNil,
}

impl ExpectationKind {
    pub const ALL: [ExpectationKind; 12] = [
        ExpectationKind::Equality,
        ExpectationKind::TypeCheck,
        ExpectationKind::RegexMatch,
        ExpectationKind::PredicateTrue,
        ExpectationKind::PredicateFalse,
        ExpectationKind::PredicateBoolean,
        ExpectationKind::Exception,
        ExpectationKind::Inverted,
        ExpectationKind::StdoutContains,
        ExpectationKind::StderrContains,
        ExpectationKind::Performance,
        ExpectationKind::NonNil,
    ];

    /// Canonical marker as written in source files.
    pub fn marker(self) -> &'static str {
        match self {
            ExpectationKind::Equality => "#=>",
            ExpectationKind::TypeCheck => "#=:>",
            ExpectationKind::RegexMatch => "#=~>",
            ExpectationKind::PredicateTrue => "#==>",
            ExpectationKind::PredicateFalse => "#=/=>",
            ExpectationKind::PredicateBoolean => "#=|>",
            ExpectationKind::Exception => "#=!>",
            ExpectationKind::Inverted => "#=<>",
            ExpectationKind::StdoutContains => "#=1>",
            ExpectationKind::StderrContains => "#=2>",
            ExpectationKind::Performance => "#=%>",
            ExpectationKind::NonNil => "#=*>",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpectationKind::Equality => "equality",
            ExpectationKind::TypeCheck => "type_check",
            ExpectationKind::RegexMatch => "regex_match",
            ExpectationKind::PredicateTrue => "predicate_true",
            ExpectationKind::PredicateFalse => "predicate_false",
            ExpectationKind::PredicateBoolean => "predicate_boolean",
            ExpectationKind::Exception => "exception",
            ExpectationKind::Inverted => "inverted",
            ExpectationKind::StdoutContains => "stdout_contains",
            ExpectationKind::StderrContains => "stderr_contains",
            ExpectationKind::Performance => "performance",
            ExpectationKind::NonNil => "non_nil",
        }
    }

    /// Kinds whose payload is never evaluated.
    pub fn takes_payload(self) -> bool {
        !matches!(self, ExpectationKind::NonNil)
    }
}

impl fmt::Display for ExpectationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One decoded assertion attached to a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Expectation {
    pub kind: ExpectationKind,
    /// Trimmed text after the marker. Empty for `NonNil`.
    pub payload: String,
    /// 0-based line of the expectation in the source file.
    pub source_line: usize,
}

impl Expectation {
    pub fn new(kind: ExpectationKind, payload: impl Into<String>, source_line: usize) -> Self {
        let payload = if kind.takes_payload() {
            payload.into().trim().to_string()
        } else {
            String::new()
        };
        Self { kind, payload, source_line }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.payload.is_empty() {
            f.write_str(self.kind.marker())
        } else {
            write!(f, "{} {}", self.kind.marker(), self.payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_distinct() {
        let mut markers: Vec<_> = ExpectationKind::ALL.iter().map(|k| k.marker()).collect();
        markers.sort();
        markers.dedup();
        assert_eq!(markers.len(), ExpectationKind::ALL.len());
    }

    #[test]
    fn non_nil_drops_payload() {
        let e = Expectation::new(ExpectationKind::NonNil, " ignored ", 3);
        assert!(e.payload.is_empty());
        assert_eq!(e.to_string(), "#=*>");
    }

    #[test]
    fn payload_is_trimmed() {
        let e = Expectation::new(ExpectationKind::Equality, "  [1, 2] ", 0);
        assert_eq!(e.payload, "[1, 2]");
        assert_eq!(e.to_string(), "#=> [1, 2]");
    }
}
