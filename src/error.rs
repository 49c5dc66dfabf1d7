//! Error types and Result aliases for ScriptDeck

use std::fmt;
use std::path::PathBuf;

/// Result type alias for ScriptDeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ScriptDeck
#[derive(Debug)]
pub enum Error {
    // === Script resolution errors ===
    /// Failed to materialize inline code into a temporary script file
    ScriptMaterializationFailed {
        reason: String,
    },

    // === Launch errors ===
    /// Interpreter executable could not be found
    InterpreterNotFound {
        command: String,
    },

    /// The OS refused to create the interpreter process
    LaunchFailed {
        command: String,
        reason: String,
    },

    /// Failed to obtain a reader for the process output stream
    StreamAttachFailed {
        reason: String,
    },

    // === Session errors ===
    /// Session id not present in the registry
    SessionNotFound {
        session_id: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to save configuration file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Failed to parse configuration
    ConfigParseFailed {
        reason: String,
    },

    // === Page viewer errors ===
    /// Failed to fetch a page for the viewer tab
    PageFetchFailed {
        url: String,
        reason: String,
    },

    // === I/O and serialization errors (kept for compatibility) ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Script resolution errors
            Error::ScriptMaterializationFailed { reason } => {
                write!(f, "Failed to write temporary script file: {}", reason)
            }
            // Launch errors
            Error::InterpreterNotFound { command } => {
                write!(f, "Interpreter '{}' not found in PATH", command)
            }
            Error::LaunchFailed { command, reason } => {
                write!(f, "Failed to launch '{}': {}", command, reason)
            }
            Error::StreamAttachFailed { reason } => {
                write!(f, "Failed to attach to process output stream: {}", reason)
            }

            // Session errors
            Error::SessionNotFound { session_id } => {
                write!(f, "Session '{}' not found", session_id)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(f, "Failed to save config to '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigParseFailed { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }

            // Page viewer errors
            Error::PageFetchFailed { url, reason } => {
                write!(f, "Failed to load '{}': {}", url, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
