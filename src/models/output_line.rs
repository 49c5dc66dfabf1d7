//! Output Line Model
//!
//! Represents a single line of interpreter output. Lines are immutable once
//! produced; the line number records arrival order within the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single line of process output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    /// The text content, without its trailing newline
    pub text: String,

    /// Position in the output (arrival order, starting at 0)
    pub line_number: usize,

    /// When this line was received
    pub timestamp: DateTime<Utc>,
}

impl OutputLine {
    /// Create a new output line
    pub fn new(text: String, line_number: usize) -> Self {
        Self {
            text,
            line_number,
            timestamp: Utc::now(),
        }
    }
}

impl Default for OutputLine {
    fn default() -> Self {
        Self::new(String::new(), 0)
    }
}

impl From<String> for OutputLine {
    fn from(text: String) -> Self {
        Self::new(text, 0)
    }
}

impl From<&str> for OutputLine {
    fn from(text: &str) -> Self {
        Self::new(text.to_string(), 0)
    }
}
