// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal colors and glyphs.
//!
//! Respects NO_COLOR and FORCE_COLOR. Colors are automatically disabled when
//! output is piped.

use colored::{ColoredString, Colorize};

/// Initialize color support based on environment.
/// Call once at startup.
pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn warning_label() -> ColoredString {
    "warning".yellow().bold()
}

pub fn status_pass() -> ColoredString {
    "✓".green()
}

pub fn status_fail() -> ColoredString {
    "✗".red()
}

pub fn line_range(text: &str) -> ColoredString {
    format!("{:>7}", text).blue()
}

pub fn file_path(path: &str) -> ColoredString {
    path.underline()
}

pub fn separator(width: usize) -> ColoredString {
    "─".repeat(width).dimmed()
}

pub fn marker(text: &str) -> ColoredString {
    text.cyan()
}

pub fn detail(text: &str) -> ColoredString {
    text.dimmed()
}

pub fn passed_count(n: usize) -> ColoredString {
    format!("{} passed", n).green()
}

pub fn failed_count(n: usize) -> ColoredString {
    if n > 0 {
        format!("{} failed", n).red()
    } else {
        format!("{} failed", n).normal()
    }
}

pub fn phase_failure(text: &str) -> ColoredString {
    text.red().bold()
}
