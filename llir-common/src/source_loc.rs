//! Source location tracking for error reporting
//!
//! IR text is consumed one line at a time, so a location is a file name
//! plus a 1-based line number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line in an IR input file (1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
}

impl SourceLocation {
    /// Create a location with filename
    pub fn new(filename: &str, line: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
        }
    }

    /// Create a location in the anonymous input
    pub fn new_simple(line: u32) -> Self {
        Self::new("<input>", line)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}
