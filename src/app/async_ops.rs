//! Async Operations
//!
//! Background task processing for session launches, page fetches, and
//! cancellation. This loop runs on the app's tokio runtime so the UI thread
//! never blocks on process or network I/O.
//!
//! ## Architecture
//!
//! The async operation system uses channels to communicate between the UI
//! thread and background tasks:
//!
//! ```text
//! ┌──────────────────┐          ┌──────────────────┐
//! │    UI Thread     │          │  Background Task │
//! │  (ScriptDeckApp) │          │ (async_ops loop) │
//! │                  │          │                  │
//! │  async_tx ─────────────────▶│  request_rx      │
//! │                  │          │                  │
//! │  async_rx ◀─────────────────│  result_tx       │
//! └──────────────────┘          └──────────────────┘
//! ```
//!
//! Session output itself does NOT round-trip through this loop: once a
//! session starts, its event receiver is handed to the owning tab and drained
//! directly each frame.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use scriptdeck::error::Error;
use scriptdeck::exec::{SessionHandle, SessionRegistry};
use scriptdeck::models::{Interpreter, ScriptSource};

/// Async operation request sent from UI to background task
#[derive(Debug)]
pub(crate) enum AsyncRequest {
    /// Start a session for the given tab
    RunScript {
        tab_id: u64,
        interpreter: Interpreter,
        source: ScriptSource,
    },
    /// Fetch a page body for a viewer tab
    FetchPage { tab_id: u64, url: String },
    /// Cancel a running session
    CancelSession { session_id: String },
}

/// Async operation result sent from background task to UI
#[derive(Debug)]
pub(crate) enum AsyncResult {
    /// Session started (possibly already in a Failed state); the receiver in
    /// the handle delivers the ordered event stream
    SessionStarted { tab_id: u64, handle: SessionHandle },
    /// Session could not be created at all (script materialization failed)
    SessionStartFailed { tab_id: u64, error: String },
    /// Page fetch finished
    PageLoaded { tab_id: u64, content: String },
    /// Page fetch failed
    PageLoadFailed { tab_id: u64, error: String },
    /// Cancel request processed (an unknown session id is reported here)
    CancelFailed { session_id: String, error: String },
}

/// Run the async operation processing loop
///
/// This function runs in a background task and processes requests from the
/// UI thread until the request channel closes.
pub(crate) async fn async_operation_loop(
    request_rx: &mut mpsc::UnboundedReceiver<AsyncRequest>,
    result_tx: mpsc::UnboundedSender<AsyncResult>,
    registry: Arc<SessionRegistry>,
) {
    info!("Starting async operation loop");

    while let Some(request) = request_rx.recv().await {
        match request {
            AsyncRequest::RunScript {
                tab_id,
                interpreter,
                source,
            } => {
                info!(
                    "Processing RunScript for tab {} ({} / {})",
                    tab_id,
                    interpreter.id,
                    source.description()
                );

                match registry.start_session(interpreter, source).await {
                    Ok(handle) => {
                        let _ = result_tx.send(AsyncResult::SessionStarted { tab_id, handle });
                    }
                    Err(e) => {
                        error!("Session start failed for tab {}: {}", tab_id, e);
                        let _ = result_tx.send(AsyncResult::SessionStartFailed {
                            tab_id,
                            error: e.to_string(),
                        });
                    }
                }
            }
            AsyncRequest::FetchPage { tab_id, url } => {
                info!("Processing FetchPage for tab {}: {}", tab_id, url);

                // ureq is blocking; run the fetch on its own task so slow
                // servers do not hold up later requests
                let result_tx = result_tx.clone();
                tokio::task::spawn_blocking(move || {
                    let message = match fetch_page(&url) {
                        Ok(content) => AsyncResult::PageLoaded { tab_id, content },
                        Err(e) => {
                            warn!("{}", e);
                            AsyncResult::PageLoadFailed {
                                tab_id,
                                error: e.to_string(),
                            }
                        }
                    };
                    let _ = result_tx.send(message);
                });
            }
            AsyncRequest::CancelSession { session_id } => {
                info!("Processing CancelSession for {}", session_id);

                if let Err(e) = registry.cancel(&session_id).await {
                    warn!("Cancel failed for session {}: {}", session_id, e);
                    let _ = result_tx.send(AsyncResult::CancelFailed {
                        session_id,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    info!("Async operation loop ended");
}

/// Fetch a URL's body as text
fn fetch_page(url: &str) -> Result<String, Error> {
    let mut response = ureq::get(url).call().map_err(|e| Error::PageFetchFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| Error::PageFetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
}
