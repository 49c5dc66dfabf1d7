//! Session Event System
//!
//! Events crossing from a session's worker thread into the UI context. Each
//! session has its own single-producer channel, so events arrive at the
//! presentation surface in exactly the order they were produced: zero or more
//! `Line` events followed by exactly one terminal event.

use crate::models::OutputLine;

/// Events emitted by a running execution session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// One line of merged interpreter output
    Line {
        /// The owning session id
        session_id: String,
        /// The line, in arrival order
        line: OutputLine,
    },
    /// The process terminated and its output is fully drained
    Exited {
        /// The owning session id
        session_id: String,
        /// Exit code reported by the OS, propagated verbatim
        exit_code: i32,
    },
    /// The session failed: launch error, wait interruption, or cancellation
    Failed {
        /// The owning session id
        session_id: String,
        /// Description of the failure
        reason: String,
    },
}

impl SessionEvent {
    /// The session this event belongs to
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::Line { session_id, .. } => session_id,
            SessionEvent::Exited { session_id, .. } => session_id,
            SessionEvent::Failed { session_id, .. } => session_id,
        }
    }

    /// Whether this event ends the session's stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionEvent::Line { .. })
    }

    /// The text the presentation surface appends for this event
    pub fn display_text(&self) -> String {
        match self {
            SessionEvent::Line { line, .. } => line.text.clone(),
            SessionEvent::Exited { exit_code, .. } => {
                format!("Process exited with code: {}", exit_code)
            }
            SessionEvent::Failed { reason, .. } => {
                format!("Execution failed: {}", reason)
            }
        }
    }
}
