// SPDX-License-Identifier: (MIT OR Apache-2.0)

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the command before any file runs.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid line selection `{spec}` in `{arg}` (expected 19, 19-45 or L19-L45)")]
    BadSelection { arg: String, spec: String },
    #[error("no tryout files (*_try.rhai, *.try.rhai) under {}", .0.display())]
    NoFiles(PathBuf),
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
