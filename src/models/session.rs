//! Execution Session Model
//!
//! One session is one user-triggered run of a script against one interpreter.
//! Sessions start in `Running` (or land directly in `Failed` when the launch
//! itself failed) and end in exactly one terminal state; terminal states are
//! never left again, and a session is never reused for a second run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::Interpreter;

/// Lifecycle state of an execution session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Process launched, output still streaming
    Running,
    /// Process terminated and its output is fully drained
    Exited(i32),
    /// Launch failed, stream wait was interrupted, or the run was cancelled
    Failed(String),
}

impl SessionState {
    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Running)
    }
}

/// A single execution of a script against an interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSession {
    /// Unique identifier for this session
    pub id: String,

    /// Interpreter the script was handed to
    pub interpreter: Interpreter,

    /// Concrete script path passed to the interpreter
    pub script_path: PathBuf,

    /// Current lifecycle state
    pub state: SessionState,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// When the session reached a terminal state (if it has)
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionSession {
    /// Create a new session in the Running state
    pub fn new(interpreter: Interpreter, script_path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            interpreter,
            script_path,
            state: SessionState::Running,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Create a session that never reached the Running phase
    pub fn failed_at_launch(interpreter: Interpreter, script_path: PathBuf, reason: String) -> Self {
        let mut session = Self::new(interpreter, script_path);
        session.state = SessionState::Failed(reason);
        session.finished_at = Some(Utc::now());
        session
    }

    /// Mark the session as exited with the process's reported code
    ///
    /// Ignored when the session is already in a terminal state.
    pub fn mark_exited(&mut self, exit_code: i32) {
        if self.state.is_terminal() {
            warn!(
                "Ignoring exit transition for finished session {} (state: {:?})",
                self.id, self.state
            );
            return;
        }
        self.state = SessionState::Exited(exit_code);
        self.finished_at = Some(Utc::now());
    }

    /// Mark the session as failed with a description of the failure
    ///
    /// Ignored when the session is already in a terminal state.
    pub fn mark_failed(&mut self, reason: String) {
        if self.state.is_terminal() {
            warn!(
                "Ignoring failure transition for finished session {} (state: {:?})",
                self.id, self.state
            );
            return;
        }
        self.state = SessionState::Failed(reason);
        self.finished_at = Some(Utc::now());
    }

    /// Check if the session is still running
    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running)
    }

    /// Check if the session has reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Check if the process exited with code 0
    pub fn exited_successfully(&self) -> bool {
        self.state == SessionState::Exited(0)
    }

    /// How long the session ran, once finished
    pub fn execution_duration(&self) -> Option<std::time::Duration> {
        self.finished_at.map(|end| {
            end.signed_duration_since(self.started_at)
                .to_std()
                .unwrap_or_default()
        })
    }

    /// Get a display string for the session
    pub fn display_string(&self) -> String {
        let state_str = match &self.state {
            SessionState::Running => "Running".to_string(),
            SessionState::Exited(code) => format!("Exited({})", code),
            SessionState::Failed(reason) => format!("Failed({})", reason),
        };

        format!(
            "{} {} - {}",
            self.interpreter.command,
            self.script_path.display(),
            state_str
        )
    }
}

impl std::fmt::Display for ExecutionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_string())
    }
}
