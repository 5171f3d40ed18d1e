// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `/pattern/flags` regex literals in expectation payloads.

use regex::{Regex, RegexBuilder};

/// Parse a payload written as `/pattern/flags`. Returns None when the payload
/// is not a regex literal, so the caller evaluates it as an expression.
/// Supported flags: `i`, `m`, `s`, `x`.
pub fn regex_literal(payload: &str) -> Option<Result<Regex, regex::Error>> {
    let body = payload.trim().strip_prefix('/')?;
    let close = body.rfind('/')?;
    let (pattern, flags) = (&body[..close], &body[close + 1..]);
    if !flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x')) {
        return None;
    }

    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            _ => builder.ignore_whitespace(true),
        };
    }
    Some(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_literal() {
        let re = regex_literal("/^he+llo$/").unwrap().unwrap();
        assert!(re.is_match("heeello"));
        assert!(!re.is_match("HELLO"));
    }

    #[test]
    fn flags_apply() {
        let re = regex_literal(" /hello/i ").unwrap().unwrap();
        assert!(re.is_match("Say HELLO"));
        let re = regex_literal("/a.b/s").unwrap().unwrap();
        assert!(re.is_match("a\nb"));
    }

    #[test]
    fn not_a_literal() {
        assert!(regex_literal("\"text\"").is_none());
        assert!(regex_literal("/").is_none());
        assert!(regex_literal("/a/ + 1").is_none());
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(matches!(regex_literal("/(unclosed/"), Some(Err(_))));
    }
}
