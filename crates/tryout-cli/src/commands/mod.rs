// SPDX-License-Identifier: (MIT OR Apache-2.0)

mod inspect;
mod run;

use std::path::PathBuf;

use tryout_ast::LineSpec;
use tryout_report::ExitStatus;

use crate::error::CliError;
use crate::files;
use crate::Args;

pub use inspect::cmd_inspect;
pub use run::cmd_run;

/// A file to process and the cases to keep.
pub struct Job {
    pub path: PathBuf,
    pub lines: Option<LineSpec>,
}

/// Resolve every positional argument, then run or inspect the files.
pub fn dispatch(args: &Args) -> Result<ExitStatus, CliError> {
    let mut jobs = Vec::new();
    for arg in &args.paths {
        let target = files::parse_target(arg)?;
        for path in files::collect(&target.path)? {
            jobs.push(Job { path, lines: target.lines });
        }
    }
    tracing::debug!(files = jobs.len(), "collected");

    if args.inspect {
        Ok(cmd_inspect(args, &jobs))
    } else {
        Ok(cmd_run(args, &jobs))
    }
}
