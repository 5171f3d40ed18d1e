// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Running tryout files.

use std::time::Duration;

use tryout_engine::{EngineConfig, TestBatch};
use tryout_report::json::{self, FileReport, RunReport};
use tryout_report::{ExitStatus, FormatOptions, Formatter, RunSummary};
use tryout_rhai::{RhaiConfig, RhaiEvaluator};

use super::Job;
use crate::{Args, OutputFormat};

pub fn cmd_run(args: &Args, jobs: &[Job]) -> ExitStatus {
    let formatter = Formatter::new(FormatOptions {
        verbose: args.verbose,
        fails_only: args.fails_only,
        quiet: args.quiet,
        stack_traces: args.stack_traces,
    });
    let engine_config = EngineConfig { debug: args.debug, stack_traces: args.stack_traces };
    let rhai_config = RhaiConfig { timeout: args.timeout.map(Duration::from_millis), ..Default::default() };
    let human = args.format == OutputFormat::Human;

    let mut summary = RunSummary::default();
    let mut reports = Vec::new();

    for job in jobs {
        let parsed = match tryout_parser::parse_file(&job.path) {
            Ok(run) => run,
            Err(e) => {
                summary.add_parse_error();
                if human {
                    eprintln!("{}", formatter.parse_error(&job.path, &e.to_string()));
                } else {
                    reports.push(FileReport::parse_failure(job.path.display().to_string(), e.to_string()));
                }
                continue;
            }
        };
        let run = match &job.lines {
            Some(lines) => parsed.select(lines),
            None => parsed,
        };

        // A fresh evaluator per file keeps files independent.
        let evaluator = RhaiEvaluator::with_config(rhai_config);
        let mut batch = TestBatch::new(&run, args.context_mode(), &evaluator, &evaluator, engine_config);
        batch.run();
        let ledger = batch.ledger();
        summary.add_ledger(ledger);

        if human {
            let text = formatter.file(&run, ledger);
            if !text.is_empty() {
                println!("{}\n", text);
            }
        } else {
            reports.push(FileReport::from_ledger(&run, ledger));
        }
    }

    let status = summary.exit_status();
    if human {
        println!("{}", formatter.summary(&summary));
    } else {
        println!("{}", json::to_json_string(&RunReport::new(reports, summary)));
    }
    status
}
