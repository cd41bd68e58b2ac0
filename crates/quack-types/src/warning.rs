use std::fmt;

use serde::{Deserialize, Serialize};

/// A malformed line that was skipped while loading a multi-line store.
///
/// Warnings are collected, logged, and returned alongside the loaded
/// index; they never abort a load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number in the backing file.
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl ParseWarning {
    pub fn new(line_number: usize, line: &str, reason: impl fmt::Display) -> Self {
        Self {
            line_number,
            line: line.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line_number, self.reason, self.line)
    }
}
