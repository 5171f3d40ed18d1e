// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Preparing fragment text for the rhai compiler.

/// Blank out `#` comment lines, keeping the line count so error positions
/// still map onto the source file. `#{` opens an object map and is kept.
pub(crate) fn strip_hash_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        let trimmed = line.trim_start();
        if !(trimmed.starts_with('#') && !trimmed.starts_with("#{")) {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Map a 1-based line inside a fragment back to a 0-based source line.
pub(crate) fn source_line(first_line: usize, fragment_line: Option<usize>) -> Option<usize> {
    fragment_line.map(|l| first_line + l.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_become_blank_lines() {
        let src = "# note\nlet a = 1;\n  ## inner\n#{ b: 2 }\n##=> 4\n";
        assert_eq!(strip_hash_comments(src), "\nlet a = 1;\n\n#{ b: 2 }\n\n");
    }

    #[test]
    fn line_mapping() {
        assert_eq!(source_line(10, Some(1)), Some(10));
        assert_eq!(source_line(10, Some(3)), Some(12));
        assert_eq!(source_line(10, None), None);
    }
}
