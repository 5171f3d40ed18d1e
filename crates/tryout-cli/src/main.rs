// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `try` - run literate tests written in rhai.

use std::process::ExitCode;
use std::sync::Once;

use clap::{Parser, ValueEnum};
use tryout_engine::ContextMode;
use tryout_report::style;

mod commands;
mod error;
mod files;

#[derive(Parser, Debug)]
#[command(name = "try", version)]
#[command(about = "Run literate tests: rhai code annotated with #=> expectations")]
pub struct Args {
    /// Files or directories. `PATH:19`, `PATH:19-45` and `PATH:L19-L45` select
    /// cases by line.
    #[arg(required = true, value_name = "PATH[:LINES]")]
    pub paths: Vec<String>,

    /// Run every case in one shared context (default)
    #[arg(long, conflicts_with = "fresh_context")]
    pub shared_context: bool,

    /// Give each case its own copy of the setup bindings
    #[arg(long)]
    pub fresh_context: bool,

    /// Show passing expectations and captured output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only show failing cases
    #[arg(short = 'f', long = "fails")]
    pub fails_only: bool,

    /// Only show phase failures and the summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the parsed structure instead of running
    #[arg(short, long)]
    pub inspect: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Per-fragment time limit in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Show error traces
    #[arg(short, long)]
    pub stack_traces: bool,

    /// Log fragment sources and verdicts
    #[arg(short = 'D', long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Args {
    pub fn context_mode(&self) -> ContextMode {
        if self.fresh_context && !self.shared_context {
            ContextMode::Fresh
        } else {
            ContextMode::Shared
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Logs go to stderr. `RUST_LOG` wins; `-D` alone means debug.
fn init_tracing(debug: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) if debug => EnvFilter::new("debug"),
            Err(_) => return,
        };
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn main() -> ExitCode {
    let args = Args::parse();
    style::init();
    init_tracing(args.debug);

    match commands::dispatch(&args) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("{}: {}", style::error_label(), e);
            ExitCode::from(2)
        }
    }
}
