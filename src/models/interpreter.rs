//! Interpreter Definitions
//!
//! Canonical definition of the interpreters ScriptDeck can hand scripts to.
//! The core treats an interpreter as an opaque command name plus one
//! positional argument (the script path); the set is an open enumeration
//! extended through configuration.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// An external interpreter a script can be executed with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interpreter {
    /// Identifier used in menus and configuration (e.g. "python")
    pub id: String,
    /// Executable name or path passed to the OS (e.g. "python3")
    pub command: String,
    /// File extension for materialized inline code, including the dot
    pub extension: String,
}

/// Interpreters available without any configuration
static BUILTIN_INTERPRETERS: Lazy<Vec<Interpreter>> = Lazy::new(|| {
    vec![
        Interpreter {
            id: "python".to_string(),
            command: "python".to_string(),
            extension: ".py".to_string(),
        },
        Interpreter {
            id: "node".to_string(),
            command: "node".to_string(),
            extension: ".js".to_string(),
        },
    ]
});

impl Interpreter {
    /// The built-in Python interpreter
    pub fn python() -> Self {
        BUILTIN_INTERPRETERS[0].clone()
    }

    /// The built-in Node.js interpreter
    pub fn node() -> Self {
        BUILTIN_INTERPRETERS[1].clone()
    }

    /// Define an interpreter not covered by the built-ins
    pub fn custom(id: &str, command: &str, extension: &str) -> Self {
        // Normalize so "py" and ".py" both work as an extension spec
        let extension = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };

        Self {
            id: id.to_string(),
            command: command.to_string(),
            extension,
        }
    }

    /// Look up a built-in interpreter by id (case-insensitive)
    pub fn builtin(id: &str) -> Option<Self> {
        let id = id.to_lowercase();
        BUILTIN_INTERPRETERS
            .iter()
            .find(|interp| interp.id == id)
            .cloned()
    }

    /// All interpreters available without configuration
    pub fn builtins() -> Vec<Self> {
        BUILTIN_INTERPRETERS.clone()
    }

    /// Human-readable label for tab titles and menus
    pub fn display_name(&self) -> &str {
        match self.id.as_str() {
            "python" => "Python",
            "node" => "Node.js",
            _ => &self.id,
        }
    }
}

impl std::fmt::Display for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.command)
    }
}
