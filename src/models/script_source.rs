//! Script Source Model
//!
//! Where the script for a run comes from: an existing file on disk, or code
//! typed into the app that must be materialized to a file before an
//! interpreter can be pointed at it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The script to execute in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptSource {
    /// Path to an existing script file
    File(PathBuf),
    /// Literal code text, tagged with the language it was written in
    Inline { code: String, language: String },
}

impl ScriptSource {
    /// Create an inline source from typed code
    pub fn inline(code: &str, language: &str) -> Self {
        Self::Inline {
            code: code.to_string(),
            language: language.to_string(),
        }
    }

    /// Whether this source needs to be materialized before launch
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    /// Short description for tab titles and logs
    pub fn description(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Inline { language, .. } => format!("{} input", language),
        }
    }
}
