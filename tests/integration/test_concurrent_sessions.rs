//! Integration Tests for Concurrent Sessions
//!
//! Sessions are independent: each owns its process and channel, and each
//! sink observes a self-consistent ordered stream regardless of how the OS
//! schedules the underlying processes. Cross-session global ordering is
//! deliberately unspecified and not asserted here.

#![cfg(unix)]

use std::io::Write;
use std::time::Duration;

use scriptdeck::exec::{SessionEvent, SessionHandle, SessionRegistry};
use scriptdeck::models::{Interpreter, ScriptSource};

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

async fn collect_events(handle: &mut SessionHandle) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(15), handle.events.recv())
            .await
            .expect("session did not finish in time")
            .expect("channel closed before terminal event");
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            return events;
        }
    }
}

#[tokio::test]
async fn test_concurrent_sessions_never_cross_streams() {
    let registry = SessionRegistry::new();

    // Interleave wall-clock output with small sleeps so the two processes
    // genuinely overlap
    let script_a = script_file("for i in 1 2 3 4; do echo A$i; sleep 0.05; done\n");
    let script_b = script_file("for i in 1 2 3 4; do echo B$i; sleep 0.05; done\n");

    let mut handle_a = registry
        .start_session(sh(), ScriptSource::File(script_a.path().to_path_buf()))
        .await
        .expect("session A should start");
    let mut handle_b = registry
        .start_session(sh(), ScriptSource::File(script_b.path().to_path_buf()))
        .await
        .expect("session B should start");

    let (events_a, events_b) =
        tokio::join!(collect_events(&mut handle_a), collect_events(&mut handle_b));

    // Every event carries its own session's id
    assert!(events_a
        .iter()
        .all(|e| e.session_id() == handle_a.session_id));
    assert!(events_b
        .iter()
        .all(|e| e.session_id() == handle_b.session_id));

    // Each sink sees its lines in production order, then its status line
    let texts_a: Vec<String> = events_a.iter().map(|e| e.display_text()).collect();
    let texts_b: Vec<String> = events_b.iter().map(|e| e.display_text()).collect();
    assert_eq!(
        texts_a,
        vec!["A1", "A2", "A3", "A4", "Process exited with code: 0"]
    );
    assert_eq!(
        texts_b,
        vec!["B1", "B2", "B3", "B4", "Process exited with code: 0"]
    );
}

#[tokio::test]
async fn test_sessions_have_distinct_ids_and_processes() {
    let registry = SessionRegistry::new();
    let script = script_file("echo hi\n");

    let mut first = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("first session");
    let mut second = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("second session");

    assert_ne!(first.session_id, second.session_id);

    collect_events(&mut first).await;
    collect_events(&mut second).await;

    let info_first = registry.info(&first.session_id).await.unwrap();
    let info_second = registry.info(&second.session_id).await.unwrap();
    if let (Some(pid_a), Some(pid_b)) = (info_first.pid, info_second.pid) {
        assert_ne!(pid_a, pid_b, "sessions never share a process");
    }
}

#[tokio::test]
async fn test_registry_counts_across_concurrent_runs() {
    let registry = SessionRegistry::new();
    let script = script_file("sleep 0.3\n");

    let mut handles = Vec::new();
    for _ in 0..3 {
        handles.push(
            registry
                .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
                .await
                .expect("session should start"),
        );
    }

    assert_eq!(registry.session_count().await, 3);

    for handle in &mut handles {
        collect_events(handle).await;
    }

    assert_eq!(registry.active_count().await, 0);
    assert_eq!(registry.cleanup_finished().await, 3);
    assert_eq!(registry.session_count().await, 0);
}
