//! Contract Tests for the Session Registry
//!
//! These tests pin the registry's lifecycle contract: state transitions,
//! the exactly-one-terminal-event guarantee, cancellation semantics, and
//! best-effort temporary-file cleanup.

#![cfg(unix)]

use std::io::Write;
use std::time::Duration;

use scriptdeck::exec::{SessionEvent, SessionHandle, SessionRegistry};
use scriptdeck::models::{Interpreter, ScriptSource, SessionState};

fn sh() -> Interpreter {
    Interpreter::custom("sh", "sh", ".sh")
}

fn script_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("scriptdeck_test_")
        .suffix(".sh")
        .tempfile()
        .expect("fixture temp file");
    file.write_all(content.as_bytes()).expect("fixture write");
    file.flush().expect("fixture flush");
    file
}

async fn next_event(handle: &mut SessionHandle) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(10), handle.events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed unexpectedly")
}

async fn collect_events(handle: &mut SessionHandle) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        let event = next_event(handle).await;
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            return events;
        }
    }
}

#[tokio::test]
async fn test_session_is_running_while_streaming() {
    // Arrange - a script that stays alive until we have observed Running
    let registry = SessionRegistry::new();
    let script = script_file("echo started\nsleep 2\n");

    // Act
    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");

    let first = next_event(&mut handle).await;
    assert_eq!(first.display_text(), "started");

    // Assert - the first line arrived, the process is still sleeping
    assert_eq!(
        registry.state(&handle.session_id).await.unwrap(),
        SessionState::Running
    );
    assert_eq!(registry.active_count().await, 1);

    collect_events(&mut handle).await;
    assert_eq!(
        registry.state(&handle.session_id).await.unwrap(),
        SessionState::Exited(0)
    );
}

#[tokio::test]
async fn test_exactly_one_terminal_event_then_silence() {
    let registry = SessionRegistry::new();
    let script = script_file("echo only\n");

    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(
        events.last().unwrap().is_terminal(),
        "the terminal event is the last one delivered"
    );

    // The channel yields nothing further once the terminal event arrived
    let after = tokio::time::timeout(Duration::from_millis(200), handle.events.recv()).await;
    assert!(matches!(after, Ok(None) | Err(_)));
}

#[tokio::test]
async fn test_cancel_transitions_to_failed_cancelled() {
    // Arrange - a long-running script we will never let finish. `exec`
    // replaces the shell so killing the session's process releases the
    // stream immediately.
    let registry = SessionRegistry::new();
    let script = script_file("echo begun\nexec sleep 30\n");

    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");

    let first = next_event(&mut handle).await;
    assert_eq!(first.display_text(), "begun");

    // Act
    registry.cancel(&handle.session_id).await.expect("cancel");
    let events = collect_events(&mut handle).await;

    // Assert - terminal Failed("cancelled"), with nothing after it
    let last = events.last().unwrap();
    assert!(matches!(last, SessionEvent::Failed { reason, .. } if reason == "cancelled"));
    assert_eq!(last.display_text(), "Execution failed: cancelled");
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

    assert_eq!(
        registry.state(&handle.session_id).await.unwrap(),
        SessionState::Failed("cancelled".to_string())
    );
}

#[tokio::test]
async fn test_cancel_unknown_session_is_an_error() {
    let registry = SessionRegistry::new();
    assert!(registry.cancel("no-such-session").await.is_err());
}

#[tokio::test]
async fn test_info_reflects_session_metadata() {
    let registry = SessionRegistry::new();
    let script = script_file("echo hi\n");

    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    collect_events(&mut handle).await;

    let info = registry.info(&handle.session_id).await.unwrap();
    assert_eq!(info.id, handle.session_id);
    assert_eq!(info.interpreter.id, "sh");
    assert_eq!(info.script_path, script.path());
    assert_eq!(info.state, SessionState::Exited(0));
    assert!(info.started_at <= chrono::Utc::now());
}

#[tokio::test]
async fn test_inline_temp_file_released_on_cleanup() {
    let registry = SessionRegistry::new();

    let mut handle = registry
        .start_session(
            Interpreter::custom("cat", "cat", ".txt"),
            ScriptSource::inline("inline body\n", "cat"),
        )
        .await
        .expect("session should start");
    collect_events(&mut handle).await;

    // The materialized file survives the run while the session is tracked
    let info = registry.info(&handle.session_id).await.unwrap();
    assert!(info.script_path.exists());

    // Removing the finished session releases the temp file (best-effort)
    assert_eq!(registry.cleanup_finished().await, 1);
    assert!(!info.script_path.exists());
}

#[tokio::test]
async fn test_sessions_are_never_reused() {
    let registry = SessionRegistry::new();
    let script = script_file("echo run\n");

    let mut first = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("first run");
    collect_events(&mut first).await;

    // A second run of the same script is a brand-new session
    let mut second = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("second run");
    collect_events(&mut second).await;

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(registry.session_count().await, 2);
}
