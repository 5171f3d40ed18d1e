// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Printing the parsed structure of tryout files.

use tryout_ast::{CodeBlock, TestRun};
use tryout_report::{style, ExitStatus};

use super::Job;
use crate::{Args, OutputFormat};

pub fn cmd_inspect(args: &Args, jobs: &[Job]) -> ExitStatus {
    let mut status = ExitStatus::Success;
    let mut runs = Vec::new();

    for job in jobs {
        match tryout_parser::parse_file(&job.path) {
            Ok(run) => {
                let run = match &job.lines {
                    Some(lines) => run.select(lines),
                    None => run,
                };
                match args.format {
                    OutputFormat::Human => println!("{}", describe(&run)),
                    OutputFormat::Json => runs.push(run),
                }
            }
            Err(e) => {
                status = ExitStatus::CouldNotRun;
                eprintln!("{}: {}: {}", style::error_label(), style::file_path(&job.path.display().to_string()), e);
            }
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", tryout_report::json::to_json_string(&runs));
    }
    status
}

fn describe(run: &TestRun) -> String {
    let mut lines = vec![style::file_path(&run.source_file.display().to_string()).to_string()];
    for warning in &run.warnings {
        lines.push(format!("  {}: {}", style::warning_label(), warning));
    }
    block(&mut lines, "setup", &run.setup);
    for case in &run.test_cases {
        lines.push(format!("  case {}  {}", style::line_range(&case.line_range.to_string()), case.title()));
        for code in case.code.code.lines() {
            lines.push(format!("      | {}", code));
        }
        for exp in &case.expectations {
            lines.push(format!(
                "      {} {} {}",
                style::marker(exp.kind.marker()),
                exp.payload,
                style::detail(&format!("({}, line {})", exp.kind, exp.source_line + 1))
            ));
        }
    }
    block(&mut lines, "teardown", &run.teardown);
    lines.push(format!("  {} cases, {} runnable", run.test_cases.len(), run.total_tests()));
    lines.join("\n")
}

fn block(lines: &mut Vec<String>, name: &str, code: &CodeBlock) {
    if code.is_empty() {
        return;
    }
    let range = code.line_range.map(|r| r.to_string()).unwrap_or_default();
    lines.push(format!("  {} {}", name, style::line_range(&range)));
    for line in code.code.lines() {
        lines.push(format!("      | {}", line));
    }
}
