// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for tryout files.
//!
//! Turns annotated source text into a [`TestRun`]: a setup block, the ordered
//! test cases with their decoded expectations, and a teardown block.

mod decode;
mod error;
mod parser;

use std::path::Path;

use tryout_ast::TestRun;

pub use error::ParseError;
pub use parser::Parser;

/// Parse `source` as the contents of `source_file`.
pub fn parse(source: &str, source_file: impl AsRef<Path>) -> Result<TestRun, ParseError> {
    let source_file = source_file.as_ref();
    let lines = tryout_lexer::classify(source);
    let run = Parser::new(source_file, lines).parse()?;
    tracing::debug!(
        file = %source_file.display(),
        cases = run.test_cases.len(),
        tests = run.total_tests(),
        warnings = run.warnings.len(),
        "parsed"
    );
    for warning in &run.warnings {
        tracing::debug!(file = %source_file.display(), "{}", warning);
    }
    Ok(run)
}

/// Read and parse a file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<TestRun, ParseError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?;
    parse(&source, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tryout_ast::{ExpectationKind, LineRange, ParseWarning};

    fn parse_ok(src: &str) -> TestRun {
        match parse(src, "test_try.rhai") {
            Ok(run) => run,
            Err(e) => panic!("Parse error: {}", e),
        }
    }

    #[test]
    fn single_descriptionless_case() {
        let run = parse_ok("1 + 1\n#=> 2\n");
        assert_eq!(run.test_cases.len(), 1);
        assert!(run.setup.is_empty());
        assert!(run.teardown.is_empty());

        let tc = &run.test_cases[0];
        assert_eq!(tc.code.code, "1 + 1\n");
        assert_eq!(tc.expectations.len(), 1);
        assert_eq!(tc.expectations[0].kind, ExpectationKind::Equality);
        assert_eq!(tc.expectations[0].payload, "2");
        assert_eq!(tc.line_range, LineRange::new(0, 1));
        assert_eq!(run.warnings, vec![ParseWarning::UnnamedTest { line: 0 }]);
    }

    #[test]
    fn only_unnamed_cases_warn() {
        let run = parse_ok("## named
1
#=> 1

2
#=> 2

## also named
3
#=> 3
");
        assert_eq!(run.test_cases.len(), 3);
        assert_eq!(run.warnings, vec![ParseWarning::UnnamedTest { line: 4 }]);
        assert_eq!(run.warnings[0].to_string(), "line 5: test has no `##` description");
    }

    #[test]
    fn setup_cases_teardown() {
        let src = "\
let greeting = \"hi\";

## Greeting length
greeting.len()
#=> 2

## Upper case
greeting.to_upper()
#=> \"HI\"

greeting = ();
";
        let run = parse_ok(src);
        assert_eq!(run.setup.code, "let greeting = \"hi\";\n");
        assert_eq!(run.setup.line_range, Some(LineRange::single(0)));
        assert_eq!(run.test_cases.len(), 2);
        assert_eq!(run.test_cases[0].description, "Greeting length");
        assert_eq!(run.test_cases[0].line_range, LineRange::new(2, 4));
        assert_eq!(run.test_cases[1].description, "Upper case");
        assert_eq!(run.test_cases[1].code.code, "greeting.to_upper()\n");
        assert_eq!(run.teardown.code, "greeting = ();\n");
        assert_eq!(run.teardown.line_range, Some(LineRange::single(10)));
        assert_eq!(run.total_tests(), 2);
    }

    #[test]
    fn multi_line_descriptions_join_with_newline() {
        let run = parse_ok("## First line\n\n## second line\nx\n#=> 1\n");
        assert_eq!(run.test_cases[0].description, "First line\nsecond line");
        assert_eq!(run.test_cases[0].line_range.start, 0);
    }

    #[test]
    fn blanks_and_comments_between_expectations() {
        let src = "## many\nlet a = 1;\na\n\n# about the next one\n#=> 1\n\n#==> result == 1\n";
        let run = parse_ok(src);
        let tc = &run.test_cases[0];
        assert_eq!(tc.code.code, "let a = 1;\na\n\n# about the next one\n");
        assert_eq!(tc.expectations.len(), 2);
        assert_eq!(tc.expectations[1].kind, ExpectationKind::PredicateTrue);
        assert_eq!(tc.expectations[1].source_line, 7);
    }

    #[test]
    fn interior_blank_lines_kept_in_code() {
        let run = parse_ok("## gap\n\nlet a = 1;\n\nlet b = 2;\n\n#=> ()\n");
        let code = &run.test_cases[0].code;
        assert_eq!(code.code, "let a = 1;\n\nlet b = 2;\n");
        assert_eq!(code.line_range, Some(LineRange::new(2, 4)));
    }

    #[test]
    fn commented_expectation_is_inert() {
        let run = parse_ok("## inert\nlet x = 5;\n##=> 4\nx\n#=> 5\n");
        let tc = &run.test_cases[0];
        assert_eq!(tc.expectations.len(), 1);
        assert_eq!(tc.code.code, "let x = 5;\n##=> 4\nx\n");
    }

    #[test]
    fn commented_expectation_in_description_run() {
        let run = parse_ok("## documented\n##=> old\n1\n#=> 1\n");
        assert_eq!(run.test_cases[0].description, "documented\n##=> old");
    }

    #[test]
    fn every_marker_kind_decodes() {
        let src = "\
## all kinds
1
#=> 1
#=:> i64
#=~> /1/
#==> true
#=/=> false
#=|> true
#=<> 2
#=1> out
#=2> err
#=%> 100
#=*>
";
        let run = parse_ok(src);
        let kinds: Vec<_> = run.test_cases[0].expectations.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ExpectationKind::Equality,
                ExpectationKind::TypeCheck,
                ExpectationKind::RegexMatch,
                ExpectationKind::PredicateTrue,
                ExpectationKind::PredicateFalse,
                ExpectationKind::PredicateBoolean,
                ExpectationKind::Inverted,
                ExpectationKind::StdoutContains,
                ExpectationKind::StderrContains,
                ExpectationKind::Performance,
                ExpectationKind::NonNil,
            ]
        );
    }

    #[test]
    fn code_after_expectations_opens_new_case() {
        let run = parse_ok("## first\n1\n#=> 1\n2\n#=> 2\n");
        assert_eq!(run.test_cases.len(), 2);
        assert_eq!(run.test_cases[1].description, "");
        assert_eq!(run.test_cases[1].code.code, "2\n");
        assert_eq!(run.test_cases[1].line_range, LineRange::new(3, 4));
    }

    #[test]
    fn comments_after_expectations_move_with_following_code() {
        let run = parse_ok("## first\n1\n#=> 1\n# cleanup\ncleanup();\n");
        assert_eq!(run.teardown.code, "# cleanup\ncleanup();\n");
    }

    #[test]
    fn header_comments_are_not_setup() {
        let run = parse_ok("# Tests for math\n\n## adds\n1 + 1\n#=> 2\n");
        assert!(run.setup.is_empty());
        assert_eq!(run.test_cases[0].code.code, "1 + 1\n");
    }

    #[test]
    fn description_without_expectation_is_an_error() {
        let err = parse("## lonely\n1 + 1\n", "t_try.rhai").unwrap_err();
        match err {
            ParseError::MissingExpectation { line, description } => {
                assert_eq!(line, 0);
                assert_eq!(description, "lonely");
            }
            other => panic!("unexpected error: {}", other),
        }

        let err = parse("## one\n1\n## two\n2\n#=> 2\n", "t_try.rhai").unwrap_err();
        assert!(matches!(err, ParseError::MissingExpectation { line: 0, .. }));
    }

    #[test]
    fn stray_code_between_cases_is_an_error() {
        let err = parse("## one\n1\n#=> 1\nlet z = 3;\n## two\n2\n#=> 2\n", "t_try.rhai").unwrap_err();
        assert!(matches!(err, ParseError::StrayCode { line: 3 }));
        assert!(err.to_string().starts_with("line 4:"));
    }

    #[test]
    fn warnings_are_recorded() {
        let run = parse_ok("## warn\n1\n#=foo> 1\n#=3> x\n#=*> junk\n#=> 1\n");
        assert_eq!(
            run.warnings,
            vec![
                ParseWarning::MalformedExpectation { line: 2, syntax: "foo".to_string() },
                ParseWarning::UnsupportedPipe { line: 3, pipe: 3 },
                ParseWarning::PayloadIgnored { line: 4, marker: "#=*>" },
            ]
        );
        assert_eq!(run.test_cases[0].expectations.len(), 2);
    }

    #[test]
    fn test_heading_form() {
        let run = parse_ok("# TEST 1: heading\n1\n#=> 1\n");
        assert_eq!(run.test_cases[0].description, "heading");
    }

    #[test]
    fn parsing_is_deterministic() {
        let src = "let a = 1;\n## one\na\n#=> 1\n## two\na + 1\n#=> 2\n#=1> x\nprint(\"done\");\n";
        assert_eq!(parse_ok(src), parse_ok(src));
    }

    #[test]
    fn code_only_file_is_all_setup() {
        let run = parse_ok("let a = 1;\nlet b = 2;\n");
        assert_eq!(run.total_tests(), 0);
        assert_eq!(run.setup.code, "let a = 1;\nlet b = 2;\n");
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("math_try.rhai");
        std::fs::write(&path, "## sum\n1 + 2\n#=> 3\n").unwrap();
        let run = parse_file(&path).unwrap();
        assert_eq!(run.source_file, path);
        assert_eq!(run.total_tests(), 1);

        let missing = parse_file(dir.path().join("nope_try.rhai")).unwrap_err();
        assert!(matches!(missing, ParseError::Io { .. }));
    }
}
