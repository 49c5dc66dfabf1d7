//! Configuration management for ScriptDeck
//!
//! TOML-based configuration with sensible defaults: UI settings for the
//! tabbed window and the interpreter table feeding the execution subsystem.
//! Loading never panics; a broken or missing file falls back to defaults at
//! the call site.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::models::Interpreter;

pub use loader::ConfigLoader;

/// Main configuration structure for ScriptDeck
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,

    /// Script execution configuration
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// UI-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Font size in points
    pub font_size: u32,

    /// URL loaded into the initial page tab
    pub start_url: String,

    /// Initial window dimensions (width, height)
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_size: 13,
            start_url: "https://example.com/".to_string(),
            window_size: (1000.0, 650.0),
        }
    }
}

/// Execution-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Interpreters available in the Run menus, in addition to the built-ins.
    /// Entries with an id matching a built-in override it (e.g. pointing
    /// "python" at "python3").
    #[serde(default)]
    pub interpreters: Vec<InterpreterEntry>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            interpreters: Vec::new(),
        }
    }
}

/// One configured interpreter mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterEntry {
    /// Identifier shown in menus (e.g. "python")
    pub id: String,
    /// Executable name or path (e.g. "python3")
    pub command: String,
    /// Extension for materialized inline code (with or without the dot)
    pub extension: String,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid font size: {0} (must be between 8 and 72)")]
    InvalidFontSize(u32),

    #[error("Invalid window size: {0}x{1} (minimum 400x300)")]
    InvalidWindowSize(f32, f32),

    #[error("Interpreter entry '{0}' has an empty command")]
    EmptyInterpreterCommand(String),

    #[error("Duplicate interpreter id: {0}")]
    DuplicateInterpreterId(String),
}

impl Config {
    /// Validate the configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8..=72).contains(&self.ui.font_size) {
            return Err(ConfigError::InvalidFontSize(self.ui.font_size));
        }

        let (width, height) = self.ui.window_size;
        if width < 400.0 || height < 300.0 {
            return Err(ConfigError::InvalidWindowSize(width, height));
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.execution.interpreters {
            if entry.command.trim().is_empty() {
                return Err(ConfigError::EmptyInterpreterCommand(entry.id.clone()));
            }
            if !seen.insert(entry.id.to_lowercase()) {
                return Err(ConfigError::DuplicateInterpreterId(entry.id.clone()));
            }
        }

        Ok(())
    }

    /// The full interpreter table: built-ins plus configured entries, with
    /// configured entries overriding built-ins of the same id.
    pub fn interpreters(&self) -> Vec<Interpreter> {
        let mut table = Interpreter::builtins();

        for entry in &self.execution.interpreters {
            let interpreter = Interpreter::custom(&entry.id, &entry.command, &entry.extension);
            if let Some(existing) = table
                .iter_mut()
                .find(|i| i.id.eq_ignore_ascii_case(&interpreter.id))
            {
                *existing = interpreter;
            } else {
                table.push(interpreter);
            }
        }

        table
    }

    /// Look up an interpreter by id across built-ins and configured entries
    pub fn interpreter(&self, id: &str) -> Option<Interpreter> {
        self.interpreters()
            .into_iter()
            .find(|i| i.id.eq_ignore_ascii_case(id))
    }
}
