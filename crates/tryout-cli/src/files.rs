// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Command-line targets and tryout file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tryout_ast::LineSpec;

use crate::error::CliError;

/// File name suffixes picked up when a directory is given.
const SUFFIXES: [&str; 2] = ["_try.rhai", ".try.rhai"];

/// One positional argument: a path and an optional line selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub lines: Option<LineSpec>,
}

pub fn parse_target(arg: &str) -> Result<Target, CliError> {
    if let Some((path, spec)) = arg.rsplit_once(':') {
        let looks_like_lines = spec.starts_with(|c: char| c.is_ascii_digit() || c == 'L' || c == 'l');
        if !path.is_empty() && looks_like_lines && !Path::new(arg).exists() {
            return match LineSpec::parse(spec) {
                Some(lines) => Ok(Target { path: PathBuf::from(path), lines: Some(lines) }),
                None => Err(CliError::BadSelection { arg: arg.to_string(), spec: spec.to_string() }),
            };
        }
    }
    Ok(Target { path: PathBuf::from(arg), lines: None })
}

pub fn is_tryout_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| SUFFIXES.iter().any(|s| name.ends_with(s) && name.len() > s.len()))
}

/// Files to run for a target. A file is taken as given; a directory is
/// searched recursively.
pub fn collect(target: &Path) -> Result<Vec<PathBuf>, CliError> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    if !target.is_dir() {
        return Err(CliError::NotFound(target.to_path_buf()));
    }
    let mut files = Vec::new();
    walk(target, &mut files)?;
    files.sort();
    if files.is_empty() {
        return Err(CliError::NoFiles(target.to_path_buf()));
    }
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CliError> {
    let entries = fs::read_dir(dir).map_err(|source| CliError::Io { path: dir.to_path_buf(), source })?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if is_tryout_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}
