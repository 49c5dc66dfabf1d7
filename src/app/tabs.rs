//! Tab Models
//!
//! The tab strip's data model. Tabs are plain state; all rendering happens in
//! the app's update loop. Script and code-input tabs own the receiving end of
//! their session's event channel and drain it once per frame.

use std::path::PathBuf;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

use scriptdeck::exec::SessionEvent;
use scriptdeck::models::Interpreter;

/// What a page tab is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Fetch in flight
    Loading,
    /// Body text of the fetched page
    Loaded(String),
    /// Fetch failed; the message replaces the page text
    Failed(String),
}

/// The output side of a script or code-input tab
#[derive(Debug, Default)]
pub struct SessionView {
    /// Session id, once the session has started
    pub session_id: Option<String>,
    /// Receiver for the session's ordered event stream
    pub events: Option<UnboundedReceiver<SessionEvent>>,
    /// Lines shown in the output area, in arrival order
    pub lines: Vec<String>,
    /// Set once the terminal event arrived
    pub finished: bool,
}

impl SessionView {
    /// Attach a freshly started session to this view
    pub fn attach(&mut self, session_id: String, events: UnboundedReceiver<SessionEvent>) {
        self.session_id = Some(session_id);
        self.events = Some(events);
        self.finished = false;
    }

    /// Forget the previous run so a new one can start cleanly
    pub fn reset(&mut self) {
        self.session_id = None;
        self.events = None;
        self.lines.clear();
        self.finished = false;
    }

    /// Whether a session is attached and still producing events
    pub fn is_running(&self) -> bool {
        self.events.is_some() && !self.finished
    }

    /// Drain pending events into the line buffer without blocking.
    /// Returns true when anything new arrived.
    pub fn drain_events(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };

        let mut changed = false;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    self.lines.push(event.display_text());
                    changed = true;
                    if terminal {
                        self.finished = true;
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }

        changed
    }

    /// The full output as one copyable string
    pub fn output_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// The different kinds of tabs in the strip
pub enum TabKind {
    /// Page viewer: address field + fetched body text
    Page {
        address: String,
        content: PageContent,
    },
    /// Read-only view of a local text file
    FileView { path: PathBuf, content: String },
    /// Output of a script file run
    Script {
        interpreter: Interpreter,
        script_path: PathBuf,
        view: SessionView,
    },
    /// Editable code area with an output area below
    CodeInput {
        interpreter: Interpreter,
        code: String,
        view: SessionView,
    },
}

/// One tab in the strip
pub struct Tab {
    /// Stable id used to route async results back to the right tab
    pub id: u64,
    /// Title shown in the strip
    pub title: String,
    pub kind: TabKind,
}

impl Tab {
    pub fn new(id: u64, title: String, kind: TabKind) -> Self {
        Self { id, title, kind }
    }

    /// The session view, for tab kinds that have one
    pub fn session_view_mut(&mut self) -> Option<&mut SessionView> {
        match &mut self.kind {
            TabKind::Script { view, .. } => Some(view),
            TabKind::CodeInput { view, .. } => Some(view),
            _ => None,
        }
    }

    /// Whether this tab has a running session
    pub fn has_running_session(&self) -> bool {
        match &self.kind {
            TabKind::Script { view, .. } => view.is_running(),
            TabKind::CodeInput { view, .. } => view.is_running(),
            _ => false,
        }
    }
}
