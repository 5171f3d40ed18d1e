// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The line classifier implementation using logos.

use logos::Logos;
use tryout_ast::ExpectationKind;

/// Raw marker type for logos. Only the first token of a line is lexed;
/// whatever follows it is the line's payload.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawMarker {
    #[regex(r"#[ \t]*TEST[ \t]*[0-9]*:")]
    TestHeading,

    // === Expectation markers ===
    #[regex(r"#[ \t]*=>")]
    Equality,
    #[regex(r"#[ \t]*=:>")]
    TypeCheck,
    #[regex(r"#[ \t]*=~>")]
    RegexMatch,
    #[regex(r"#[ \t]*==>")]
    PredicateTrue,
    #[regex(r"#[ \t]*=/=>")]
    PredicateFalse,
    #[regex(r"#[ \t]*=\|>")]
    PredicateBoolean,
    #[regex(r"#[ \t]*=!>")]
    Exception,
    #[regex(r"#[ \t]*=<>")]
    Inverted,
    #[regex(r"#[ \t]*=%>")]
    Performance,
    #[regex(r"#[ \t]*=\*>")]
    NonNil,
    #[regex(r"#[ \t]*=[0-9]+>")]
    Output,

    // `#=xyz>`: looks like a marker but isn't one
    #[regex(r"#[ \t]*=[^>=:!~%*|/<0-9 \t\r\n][^> \t\r\n]*>")]
    Malformed,

    // Object map literal at column 0 is code, not a comment
    #[token("#{")]
    MapLiteral,

    #[token("#")]
    Comment,
}

impl RawMarker {
    fn is_expectation(self) -> bool {
        !matches!(
            self,
            RawMarker::TestHeading | RawMarker::Malformed | RawMarker::MapLiteral | RawMarker::Comment
        )
    }
}

/// Which expectation marker opened a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectationMarker {
    Kind(ExpectationKind),
    /// `#=N>` with the pipe number N. Numbers too large for `u32` saturate.
    Output(u32),
}

/// Classification of one physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Description text with the marker stripped and trimmed.
    Description(&'a str),
    /// Raw text after the marker, untrimmed.
    Expectation { marker: ExpectationMarker, payload: &'a str },
    CommentedExpectation,
    /// The text between `=` and `>`.
    MalformedExpectation { syntax: &'a str },
    Comment,
    Blank,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// 0-based physical line index.
    pub index: usize,
    /// The line as written, without the line terminator.
    pub text: &'a str,
    pub kind: LineKind<'a>,
}

/// Classify every physical line of `source`, in order.
pub fn classify(source: &str) -> Vec<ClassifiedLine<'_>> {
    source
        .lines()
        .enumerate()
        .map(|(index, text)| classify_line(index, text))
        .collect()
}

/// Classify a single line. Markers are recognised only at column 0.
pub fn classify_line(index: usize, text: &str) -> ClassifiedLine<'_> {
    let text = text.strip_suffix('\r').unwrap_or(text);
    let kind = if text.trim().is_empty() {
        LineKind::Blank
    } else if !text.starts_with('#') {
        LineKind::Code
    } else {
        classify_marker(text)
    };
    ClassifiedLine { index, text, kind }
}

fn classify_marker(text: &str) -> LineKind<'_> {
    // `##` is settled before lexing. A `##` token would share its prefix with
    // the marker regexes, and a failed longer match falls back to `#`.
    if let Some(rest) = text.strip_prefix("##") {
        return match first_marker(&text[1..]) {
            Some((raw, _)) if raw.is_expectation() => LineKind::CommentedExpectation,
            _ => LineKind::Description(rest.trim()),
        };
    }

    let (raw, slice) = match first_marker(text) {
        Some(found) => found,
        // Unreachable for lines starting with `#`, but a comment is the safe reading.
        None => return LineKind::Comment,
    };
    let rest = &text[slice.len()..];

    let kind = match raw {
        RawMarker::TestHeading => return LineKind::Description(rest.trim()),
        RawMarker::MapLiteral => return LineKind::Code,
        RawMarker::Comment => return LineKind::Comment,
        RawMarker::Malformed => {
            return LineKind::MalformedExpectation { syntax: marker_body(slice) };
        }
        RawMarker::Output => {
            let pipe = marker_body(slice).parse::<u32>().unwrap_or(u32::MAX);
            return LineKind::Expectation { marker: ExpectationMarker::Output(pipe), payload: rest };
        }
        RawMarker::Equality => ExpectationKind::Equality,
        RawMarker::TypeCheck => ExpectationKind::TypeCheck,
        RawMarker::RegexMatch => ExpectationKind::RegexMatch,
        RawMarker::PredicateTrue => ExpectationKind::PredicateTrue,
        RawMarker::PredicateFalse => ExpectationKind::PredicateFalse,
        RawMarker::PredicateBoolean => ExpectationKind::PredicateBoolean,
        RawMarker::Exception => ExpectationKind::Exception,
        RawMarker::Inverted => ExpectationKind::Inverted,
        RawMarker::Performance => ExpectationKind::Performance,
        RawMarker::NonNil => ExpectationKind::NonNil,
    };
    LineKind::Expectation { marker: ExpectationMarker::Kind(kind), payload: rest }
}

/// The marker opening `text` and the slice it covers.
fn first_marker(text: &str) -> Option<(RawMarker, &str)> {
    let mut lexer = RawMarker::lexer(text);
    match lexer.next() {
        Some(Ok(raw)) => Some((raw, lexer.slice())),
        _ => None,
    }
}

/// Text between the first `=` and the closing `>` of a marker slice.
fn marker_body(slice: &str) -> &str {
    let body = slice.split_once('=').map(|(_, b)| b).unwrap_or(slice);
    body.strip_suffix('>').unwrap_or(body)
}
