// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source line tracking.

use std::fmt;

/// Inclusive range of physical lines. Indexes are 0-based; `Display` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "line range {}..{} is inverted", start, end);
        Self { start, end }
    }

    pub fn single(line: usize) -> Self {
        Self { start: line, end: line }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    pub fn overlaps(&self, other: &LineRange) -> bool {
        !(self.end < other.start || other.end < self.start)
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a range covers at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start + 1)
        } else {
            write!(f, "{}-{}", self.start + 1, self.end + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let r = LineRange::new(2, 4);
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn overlap() {
        let a = LineRange::new(0, 3);
        assert!(a.overlaps(&LineRange::new(3, 9)));
        assert!(a.overlaps(&LineRange::new(1, 2)));
        assert!(!a.overlaps(&LineRange::new(4, 9)));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(LineRange::single(0).to_string(), "1");
        assert_eq!(LineRange::new(9, 11).to_string(), "10-12");
    }
}
