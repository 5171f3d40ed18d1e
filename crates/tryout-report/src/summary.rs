// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Totals across files and the exit-status rule.

use serde::Serialize;
use tryout_engine::ResultLedger;

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// Every case, setup and teardown succeeded.
    Success,
    /// Some case or teardown failed.
    Failures,
    /// Some file could not run at all: setup failed, or it could not be read
    /// or parsed.
    CouldNotRun,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failures => 1,
            ExitStatus::CouldNotRun => 2,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code() as u8)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub setup_failures: usize,
    pub teardown_failures: usize,
    pub parse_errors: usize,
}

impl RunSummary {
    pub fn add_ledger<V>(&mut self, ledger: &ResultLedger<'_, V>) {
        self.files += 1;
        self.total += ledger.size();
        self.passed += ledger.passed();
        self.failed += ledger.failed();
        if ledger.setup_failed() {
            self.setup_failures += 1;
        }
        if ledger.teardown_failed() {
            self.teardown_failures += 1;
        }
    }

    /// A file that could not be read or parsed.
    pub fn add_parse_error(&mut self) {
        self.files += 1;
        self.parse_errors += 1;
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.setup_failures > 0 || self.parse_errors > 0 {
            ExitStatus::CouldNotRun
        } else if self.failed > 0 || self.teardown_failures > 0 {
            ExitStatus::Failures
        } else {
            ExitStatus::Success
        }
    }

    pub fn success(&self) -> bool {
        self.exit_status() == ExitStatus::Success
    }
}
