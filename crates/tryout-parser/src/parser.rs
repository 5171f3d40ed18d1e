// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The block assembler: classified lines -> setup, test cases, teardown.

use std::mem;
use std::path::{Path, PathBuf};

use tryout_ast::{CodeBlock, Expectation, LineRange, ParseWarning, TestCase, TestRun};
use tryout_lexer::{ClassifiedLine, LineKind};

use crate::decode::decode;
use crate::error::ParseError;

/// A block under construction.
#[derive(Debug, Default)]
struct RawBlock<'a> {
    description: Vec<&'a str>,
    desc_start: Option<usize>,
    /// Code, comment, and interior blank lines, verbatim.
    body: Vec<(usize, &'a str)>,
    /// Whether `body` holds at least one code line.
    has_code: bool,
    expectations: Vec<Expectation>,
    /// Comments and blanks after an expectation. They join the source only
    /// when code follows.
    pending: Vec<(usize, &'a str)>,
}

impl<'a> RawBlock<'a> {
    fn is_untouched(&self) -> bool {
        self.description.is_empty() && self.body.is_empty() && self.expectations.is_empty()
    }

    /// Still collecting description lines: nothing but descriptions so far.
    fn in_description_run(&self) -> bool {
        !self.description.is_empty() && self.body.is_empty() && self.expectations.is_empty()
    }

    fn push_body(&mut self, index: usize, text: &'a str) {
        // Leading blanks are not part of the block.
        if self.body.is_empty() && text.trim().is_empty() {
            return;
        }
        self.body.push((index, text));
    }

    fn trim_trailing_blanks(&mut self) {
        while self.body.last().is_some_and(|(_, text)| text.trim().is_empty()) {
            self.body.pop();
        }
    }

    fn code_block(&self) -> CodeBlock {
        let (first, last) = match (self.body.first(), self.body.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => return CodeBlock::empty(),
        };
        let mut code = String::new();
        for (_, text) in &self.body {
            code.push_str(text);
            code.push('\n');
        }
        CodeBlock::new(code, Some(LineRange::new(first, last)))
    }

    fn first_code_line(&self) -> usize {
        self.body
            .iter()
            .find(|(_, text)| !text.trim_start().starts_with('#'))
            .or(self.body.first())
            .map(|(index, _)| *index)
            .unwrap_or(0)
    }

    fn into_test_case(self) -> TestCase {
        let code = self.code_block();
        let last = self.expectations.last().map(|e| e.source_line).unwrap_or(0);
        let start = self
            .desc_start
            .or_else(|| code.first_line())
            .or_else(|| self.expectations.first().map(|e| e.source_line))
            .unwrap_or(last);
        TestCase {
            description: self.description.join("\n"),
            code,
            expectations: self.expectations,
            line_range: LineRange::new(start, last),
        }
    }
}

/// Groups classified lines into blocks.
pub struct Parser<'a> {
    source_file: PathBuf,
    lines: Vec<ClassifiedLine<'a>>,
    blocks: Vec<RawBlock<'a>>,
    current: RawBlock<'a>,
    warnings: Vec<ParseWarning>,
}

impl<'a> Parser<'a> {
    pub fn new(source_file: impl AsRef<Path>, lines: Vec<ClassifiedLine<'a>>) -> Self {
        Self {
            source_file: source_file.as_ref().to_path_buf(),
            lines,
            blocks: Vec::new(),
            current: RawBlock::default(),
            warnings: Vec::new(),
        }
    }

    /// Assemble the whole file.
    pub fn parse(mut self) -> Result<TestRun, ParseError> {
        let lines = mem::take(&mut self.lines);
        for line in lines {
            self.feed(line);
        }
        self.close_block();
        self.build()
    }

    fn feed(&mut self, line: ClassifiedLine<'a>) {
        match line.kind {
            LineKind::Description(text) => self.description(line.index, text),
            LineKind::Expectation { marker, payload } => {
                match decode(marker, payload, line.index, &mut self.warnings) {
                    Some(expectation) => {
                        self.current.pending.clear();
                        self.current.expectations.push(expectation);
                    }
                    None => self.comment(line.index, line.text),
                }
            }
            LineKind::Code => self.code(line.index, line.text),
            LineKind::CommentedExpectation if self.current.in_description_run() => {
                self.current.description.push(line.text);
            }
            LineKind::MalformedExpectation { syntax } => {
                self.warnings.push(ParseWarning::MalformedExpectation {
                    line: line.index,
                    syntax: syntax.to_string(),
                });
                self.comment(line.index, line.text);
            }
            LineKind::CommentedExpectation | LineKind::Comment | LineKind::Blank => {
                self.comment(line.index, line.text)
            }
        }
    }

    fn description(&mut self, index: usize, text: &'a str) {
        let cur = &self.current;
        let starts_new = cur.has_code
            || !cur.expectations.is_empty()
            || (cur.description.is_empty() && !cur.body.is_empty());
        if starts_new {
            self.close_block();
        }
        if self.current.desc_start.is_none() {
            self.current.desc_start = Some(index);
        }
        self.current.description.push(text);
    }

    fn code(&mut self, index: usize, text: &'a str) {
        if !self.current.expectations.is_empty() {
            let carried = mem::take(&mut self.current.pending);
            self.close_block();
            for (i, t) in carried {
                self.current.push_body(i, t);
            }
        }
        self.current.push_body(index, text);
        self.current.has_code = true;
    }

    /// Comment and blank lines: part of the open code region, or held back
    /// after expectations.
    fn comment(&mut self, index: usize, text: &'a str) {
        if self.current.expectations.is_empty() {
            self.current.push_body(index, text);
        } else {
            self.current.pending.push((index, text));
        }
    }

    fn close_block(&mut self) {
        let mut block = mem::take(&mut self.current);
        if block.is_untouched() {
            return;
        }
        block.trim_trailing_blanks();
        tracing::trace!(
            desc_start = ?block.desc_start,
            lines = block.body.len(),
            expectations = block.expectations.len(),
            "closed block"
        );
        self.blocks.push(block);
    }

    fn build(mut self) -> Result<TestRun, ParseError> {
        let mut setup = CodeBlock::empty();
        let mut teardown = CodeBlock::empty();
        let mut test_cases = Vec::new();
        let count = self.blocks.len();

        for (i, block) in mem::take(&mut self.blocks).into_iter().enumerate() {
            if !block.expectations.is_empty() {
                let case = block.into_test_case();
                if case.description.is_empty() {
                    self.warnings.push(ParseWarning::UnnamedTest { line: case.line_range.start });
                }
                test_cases.push(case);
                continue;
            }
            if let Some(line) = block.desc_start {
                return Err(ParseError::MissingExpectation {
                    line,
                    description: block.description.join("\n"),
                });
            }
            // Comment-only blocks carry no code.
            if !block.has_code {
                continue;
            }
            if test_cases.is_empty() {
                setup = block.code_block();
            } else if i == count - 1 {
                teardown = block.code_block();
            } else {
                return Err(ParseError::StrayCode { line: block.first_code_line() });
            }
        }

        debug_assert!(
            test_cases.windows(2).all(|w| {
                w[0].line_range.start < w[1].line_range.start && !w[0].line_range.overlaps(&w[1].line_range)
            }),
            "test case line ranges overlap"
        );

        // Stable: warnings on the same line keep their order.
        self.warnings.sort_by_key(ParseWarning::line);
        Ok(TestRun::new(self.source_file, setup, test_cases, teardown).with_warnings(self.warnings))
    }
}
