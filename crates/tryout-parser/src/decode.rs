// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expectation decoder: marker + payload -> typed `Expectation`.

use tryout_ast::{Expectation, ExpectationKind, ParseWarning};
use tryout_lexer::ExpectationMarker;

/// Decode one expectation line. Returns None when the line must be read as
/// an ordinary comment instead; the reason is pushed onto `warnings`.
pub(crate) fn decode(
    marker: ExpectationMarker,
    payload: &str,
    line: usize,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Expectation> {
    let kind = match marker {
        ExpectationMarker::Kind(kind) => kind,
        ExpectationMarker::Output(1) => ExpectationKind::StdoutContains,
        ExpectationMarker::Output(2) => ExpectationKind::StderrContains,
        ExpectationMarker::Output(pipe) => {
            warnings.push(ParseWarning::UnsupportedPipe { line, pipe });
            return None;
        }
    };

    if !kind.takes_payload() && !payload.trim().is_empty() {
        warnings.push(ParseWarning::PayloadIgnored { line, marker: kind.marker() });
    }

    Some(Expectation::new(kind, payload, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_pipes() {
        let mut warnings = Vec::new();
        let out = decode(ExpectationMarker::Output(1), " \"Hello\"", 4, &mut warnings).unwrap();
        assert_eq!(out.kind, ExpectationKind::StdoutContains);
        assert_eq!(out.payload, "\"Hello\"");
        assert_eq!(out.source_line, 4);

        let err = decode(ExpectationMarker::Output(2), "oops", 5, &mut warnings).unwrap();
        assert_eq!(err.kind, ExpectationKind::StderrContains);
        assert!(warnings.is_empty());
    }

    #[test]
    fn unsupported_pipe_warns() {
        let mut warnings = Vec::new();
        assert!(decode(ExpectationMarker::Output(3), "x", 7, &mut warnings).is_none());
        assert_eq!(warnings, vec![ParseWarning::UnsupportedPipe { line: 7, pipe: 3 }]);
    }

    #[test]
    fn non_nil_payload_ignored() {
        let mut warnings = Vec::new();
        let e = decode(ExpectationMarker::Kind(ExpectationKind::NonNil), " junk", 2, &mut warnings)
            .unwrap();
        assert!(e.payload.is_empty());
        assert_eq!(warnings, vec![ParseWarning::PayloadIgnored { line: 2, marker: "#=*>" }]);
    }
}
