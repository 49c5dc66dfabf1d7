//! Session Registry
//!
//! Explicit registry of execution sessions keyed by session id, with
//! per-session locks so concurrent runs never block each other. The registry
//! owns each session's process handle, cancel flag, and temporary-file guard;
//! the UI only ever holds the session id and the receiving end of the event
//! channel.
//!
//! ## Worker model
//!
//! Each running session gets one dedicated OS thread that performs the
//! blocking work in a fixed order: drain the combined output stream, then
//! wait for process exit, then emit exactly one terminal event. The
//! sequential wait guarantees the status line is the last event delivered,
//! regardless of scheduling jitter.

use std::collections::HashMap;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;

use portable_pty::{Child, ChildKiller};
use tempfile::TempPath;

use crate::error::{Error, Result};
use crate::exec::events::SessionEvent;
use crate::exec::launcher;
use crate::exec::resolver;
use crate::exec::streamer::stream_lines;
use crate::models::{ExecutionSession, Interpreter, ScriptSource, SessionState};

/// Handle returned to the caller of a started session
#[derive(Debug)]
pub struct SessionHandle {
    /// Unique identifier of the session
    pub session_id: String,
    /// Receiving end of the ordered event channel; line events arrive in
    /// production order, followed by exactly one terminal event
    pub events: UnboundedReceiver<SessionEvent>,
}

/// Snapshot of a session's metadata and state
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Session identifier
    pub id: String,
    /// Interpreter the script was handed to
    pub interpreter: Interpreter,
    /// Concrete script path passed to the interpreter
    pub script_path: std::path::PathBuf,
    /// When the session was created
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Current lifecycle state
    pub state: SessionState,
    /// OS process id, when one was assigned
    pub pid: Option<u32>,
}

/// A single session entry with its own lock
struct SessionEntry {
    session: ExecutionSession,
    /// Kill handle for cancellation; dropped once the session finishes
    killer: Option<Box<dyn ChildKiller + Send + Sync>>,
    /// Set by cancel(); observed by the worker and the streamer
    cancel: Arc<AtomicBool>,
    /// Guard for a materialized inline script; removal happens when the
    /// entry is dropped (best-effort cleanup)
    /// Note: held for its Drop impl, never read
    #[allow(dead_code)]
    temp: Option<TempPath>,
    pid: Option<u32>,
}

/// Registry of execution sessions with per-session locks
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<RwLock<SessionEntry>>>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a new execution session.
    ///
    /// Materialization failures abort the run before any process is started
    /// and are returned as errors: no session is created. Launch failures do
    /// create a session, directly in the `Failed` state, whose channel
    /// delivers exactly one terminal event and no line events.
    pub async fn start_session(
        &self,
        interpreter: Interpreter,
        source: ScriptSource,
    ) -> Result<SessionHandle> {
        let mut resolved = resolver::resolve(&source, &interpreter)?;
        let temp = resolved.take_temp_guard();
        let script_path = resolved.path;

        let (tx, rx) = unbounded_channel();

        match launcher::launch(&interpreter, &script_path) {
            Ok(launched) => {
                let session = ExecutionSession::new(interpreter, script_path);
                let session_id = session.id.clone();
                let cancel = Arc::new(AtomicBool::new(false));

                let entry = Arc::new(RwLock::new(SessionEntry {
                    session,
                    killer: Some(launched.killer),
                    cancel: cancel.clone(),
                    temp,
                    pid: launched.pid,
                }));

                self.sessions
                    .write()
                    .await
                    .insert(session_id.clone(), entry.clone());

                spawn_session_worker(
                    session_id.clone(),
                    entry,
                    launched.child,
                    launched.reader,
                    tx,
                    cancel,
                )?;

                info!("Session {} started (pid: {:?})", session_id, launched.pid);
                Ok(SessionHandle {
                    session_id,
                    events: rx,
                })
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Launch failed for '{}': {}", script_path.display(), reason);

                let session =
                    ExecutionSession::failed_at_launch(interpreter, script_path, reason.clone());
                let session_id = session.id.clone();

                let entry = Arc::new(RwLock::new(SessionEntry {
                    session,
                    killer: None,
                    cancel: Arc::new(AtomicBool::new(false)),
                    temp,
                    pid: None,
                }));

                self.sessions
                    .write()
                    .await
                    .insert(session_id.clone(), entry);

                // Exactly one status line, zero output lines
                let _ = tx.send(SessionEvent::Failed {
                    session_id: session_id.clone(),
                    reason,
                });

                Ok(SessionHandle {
                    session_id,
                    events: rx,
                })
            }
        }
    }

    /// Get the current state of a session
    pub async fn state(&self, session_id: &str) -> Result<SessionState> {
        let sessions = self.sessions.read().await;
        if let Some(entry_lock) = sessions.get(session_id) {
            let entry = entry_lock.read().await;
            Ok(entry.session.state.clone())
        } else {
            Err(Error::SessionNotFound {
                session_id: session_id.to_string(),
            })
        }
    }

    /// Get information about a session
    pub async fn info(&self, session_id: &str) -> Result<SessionInfo> {
        let sessions = self.sessions.read().await;
        if let Some(entry_lock) = sessions.get(session_id) {
            let entry = entry_lock.read().await;
            Ok(SessionInfo {
                id: entry.session.id.clone(),
                interpreter: entry.session.interpreter.clone(),
                script_path: entry.session.script_path.clone(),
                started_at: entry.session.started_at,
                state: entry.session.state.clone(),
                pid: entry.pid,
            })
        } else {
            Err(Error::SessionNotFound {
                session_id: session_id.to_string(),
            })
        }
    }

    /// Cancel a running session: kill the child process and stop forwarding
    /// output. The session transitions to `Failed("cancelled")` once its
    /// worker observes the kill. Cancelling a finished session is a no-op.
    ///
    /// This operation only locks the specific session, not the whole registry.
    pub async fn cancel(&self, session_id: &str) -> Result<()> {
        let sessions = self.sessions.read().await;
        if let Some(entry_lock) = sessions.get(session_id) {
            let mut entry = entry_lock.write().await;
            if !entry.session.is_running() {
                debug!("Cancel ignored for finished session {}", session_id);
                return Ok(());
            }

            entry.cancel.store(true, Ordering::SeqCst);
            if let Some(killer) = entry.killer.as_mut() {
                if let Err(e) = killer.kill() {
                    warn!("Failed to kill process for session {}: {}", session_id, e);
                }
            }
            info!("Session {} cancel requested", session_id);
            Ok(())
        } else {
            Err(Error::SessionNotFound {
                session_id: session_id.to_string(),
            })
        }
    }

    /// Number of sessions currently in the Running state
    pub async fn active_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        let mut count = 0;
        for entry_lock in sessions.values() {
            if entry_lock.read().await.session.is_running() {
                count += 1;
            }
        }
        count
    }

    /// Total number of tracked sessions, finished ones included
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove finished sessions from the registry, releasing their
    /// temporary files. Returns the number of entries removed.
    pub async fn cleanup_finished(&self) -> usize {
        let sessions = self.sessions.read().await;

        let mut finished = Vec::new();
        for (id, entry_lock) in sessions.iter() {
            if entry_lock.read().await.session.is_finished() {
                finished.push(id.clone());
            }
        }

        let count = finished.len();

        // Drop read lock before acquiring write lock
        drop(sessions);

        if !finished.is_empty() {
            let mut sessions = self.sessions.write().await;
            for id in finished {
                sessions.remove(&id);
            }
        }

        count
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the dedicated worker thread for one session
fn spawn_session_worker(
    session_id: String,
    entry: Arc<RwLock<SessionEntry>>,
    child: Box<dyn Child + Send + Sync>,
    reader: Box<dyn Read + Send>,
    tx: UnboundedSender<SessionEvent>,
    cancel: Arc<AtomicBool>,
) -> Result<()> {
    let thread_name = format!("session-{}", &session_id[..8.min(session_id.len())]);
    thread::Builder::new()
        .name(thread_name)
        .spawn(move || run_session_worker(session_id, entry, child, reader, tx, cancel))?;
    Ok(())
}

/// Worker body: drain the stream, wait for exit, emit the terminal event
fn run_session_worker(
    session_id: String,
    entry: Arc<RwLock<SessionEntry>>,
    mut child: Box<dyn Child + Send + Sync>,
    reader: Box<dyn Read + Send>,
    tx: UnboundedSender<SessionEvent>,
    cancel: Arc<AtomicBool>,
) {
    let lines = stream_lines(reader, &tx, &session_id, &cancel);
    debug!("Session {}: stream drained ({} lines)", session_id, lines);

    // Wait runs strictly after the stream ends so the terminal event is the
    // last thing the presentation surface sees
    let wait_result = child.wait();

    let event = if cancel.load(Ordering::SeqCst) {
        SessionEvent::Failed {
            session_id: session_id.clone(),
            reason: "cancelled".to_string(),
        }
    } else {
        match wait_result {
            Ok(status) => SessionEvent::Exited {
                session_id: session_id.clone(),
                exit_code: status.exit_code() as i32,
            },
            Err(e) => SessionEvent::Failed {
                session_id: session_id.clone(),
                reason: format!("wait for process exit failed: {}", e),
            },
        }
    };

    {
        let mut entry = entry.blocking_write();
        match &event {
            SessionEvent::Exited { exit_code, .. } => entry.session.mark_exited(*exit_code),
            SessionEvent::Failed { reason, .. } => entry.session.mark_failed(reason.clone()),
            SessionEvent::Line { .. } => {}
        }
        entry.killer = None;
    }

    info!(
        "Session {} finished: {}",
        session_id,
        event.display_text()
    );
    if tx.send(event).is_err() {
        debug!("Session {}: receiver dropped before terminal event", session_id);
    }
}
