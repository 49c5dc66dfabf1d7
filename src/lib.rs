//! ScriptDeck - A tabbed GUI page viewer and script console
//!
//! This library provides the core functionality for ScriptDeck, a desktop
//! application that combines a simple page viewer with a script runner:
//! scripts are handed to external interpreters and their output streams live
//! into tabbed output views.
//!
//! ## Features
//!
//! - **Script Sessions:** One interpreter process per run, tracked through an
//!   explicit `Running → Exited | Failed` state machine
//! - **Live Output:** The merged stdout/stderr stream is read incrementally
//!   and delivered line-by-line, in order, while the process runs
//! - **Inline Code:** Typed code is materialized into temporary script files
//!   and executed exactly like uploaded scripts
//! - **Open Interpreter Set:** python and node built in, arbitrary
//!   interpreters via TOML configuration
//! - **Cancellation:** Running sessions can be cancelled; the child process
//!   is killed and the session settles in a terminal state
//!
//! ## Module Organization
//!
//! - [`config`] - Configuration loading and the interpreter table
//! - [`exec`] - Script resolution, process launch, output streaming, and the
//!   session registry
//! - [`models`] - Data structures (Interpreter, ScriptSource,
//!   ExecutionSession, OutputLine)
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Architecture
//!
//! ScriptDeck uses a hybrid threading model:
//!
//! - **Main Thread:** Runs the `egui` UI loop
//! - **Session Worker Threads:** One per running session; drain the child's
//!   combined output stream (blocking I/O), then wait for process exit
//! - **Background Task:** A tokio task that services launch/fetch/cancel
//!   requests from the UI
//!
//! Every line crosses from a worker into the UI through a single ordered
//! channel per session, so the UI always observes output in production
//! order, followed by exactly one terminal status event.

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod exec;
pub mod models;

// Re-exports for core functionality
pub use config::{Config, ConfigLoader};
pub use error::{Error, Result};
pub use exec::{SessionEvent, SessionHandle, SessionInfo, SessionRegistry};
pub use models::{ExecutionSession, Interpreter, OutputLine, ScriptSource, SessionState};

// Version information
/// The current version of ScriptDeck from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize ScriptDeck with default settings
///
/// Loads configuration from the standard locations, falling back to built-in
/// defaults when no file exists or the file fails to parse. Never panics.
///
/// # Examples
///
/// ```no_run
/// let config = scriptdeck::init();
/// println!("{} interpreters configured", config.interpreters().len());
/// ```
pub fn init() -> Config {
    info!("Initializing {} v{}", NAME, VERSION);

    let config = match ConfigLoader::load() {
        Ok(config) => {
            info!("Configuration loaded");
            config
        }
        Err(Error::ConfigNotFound) => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Config::default()
        }
    };

    let report = validate_interpreters(&config);
    for unavailable in &report.unavailable {
        warn!(
            "Interpreter '{}' is configured but '{}' was not found in PATH",
            unavailable.id, unavailable.command
        );
    }
    info!(
        "{} initialization complete ({}/{} interpreters available)",
        NAME,
        report.available.len(),
        report.available.len() + report.unavailable.len()
    );

    config
}

/// Initialize ScriptDeck with a specific configuration file
pub fn init_with_config(config_path: &std::path::Path) -> Result<Config> {
    info!(
        "Initializing {} v{} with config: {}",
        NAME,
        VERSION,
        config_path.display()
    );

    if !config_path.exists() {
        return Err(Error::ConfigLoadFailed {
            path: config_path.to_path_buf(),
            reason: "Configuration file does not exist".to_string(),
        });
    }

    let config = ConfigLoader::load_from_file(config_path)?;
    info!("Configuration loaded from: {}", config_path.display());
    Ok(config)
}

/// Which of the configured interpreters resolve to an executable right now
///
/// Availability is advisory: launching through a missing interpreter still
/// fails cleanly with a `Failed` session rather than a crash.
pub fn validate_interpreters(config: &Config) -> InterpreterReport {
    let mut report = InterpreterReport::default();

    for interpreter in config.interpreters() {
        if exec::is_command_available(&interpreter.command) {
            report.available.push(interpreter);
        } else {
            report.unavailable.push(interpreter);
        }
    }

    report
}

/// Result of checking the interpreter table against the local system
#[derive(Debug, Clone, Default)]
pub struct InterpreterReport {
    /// Interpreters whose executable was found
    pub available: Vec<Interpreter>,
    /// Interpreters whose executable is missing from PATH
    pub unavailable: Vec<Interpreter>,
}
