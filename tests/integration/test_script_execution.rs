//! Integration Tests for Script Execution and Output Streaming
//!
//! End-to-end tests of the execution subsystem: resolve → launch → stream →
//! wait, observed through the session event channel exactly as the UI
//! observes it. The tests register `sh`, `cat` and `true` as interpreters so
//! they run on any Unix system without python or node installed, which also
//! exercises the open interpreter enumeration.

#![cfg(unix)]

use std::io::Write;
use std::time::Duration;

use scriptdeck::exec::{SessionEvent, SessionHandle, SessionRegistry};
use scriptdeck::models::{Interpreter, ScriptSource, SessionState};

/// Interpreter that executes the script file as a shell script
fn sh() -> Interpreter {
    Interpreter::custom("sh", "sh", ".sh")
}

/// Interpreter that prints the script file itself
fn cat() -> Interpreter {
    Interpreter::custom("cat", "cat", ".txt")
}

/// Write a fixture script to a temp file kept alive by the returned guard
fn script_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("scriptdeck_test_")
        .suffix(suffix)
        .tempfile()
        .expect("fixture temp file");
    file.write_all(content.as_bytes()).expect("fixture write");
    file.flush().expect("fixture flush");
    file
}

/// Collect every event up to and including the terminal one
async fn collect_events(handle: &mut SessionHandle) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(10), handle.events.recv())
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

fn display_texts(events: &[SessionEvent]) -> Vec<String> {
    events.iter().map(|e| e.display_text()).collect()
}

#[tokio::test]
async fn test_lines_arrive_in_order_with_one_status_line() {
    // Arrange
    let registry = SessionRegistry::new();
    let script = script_file("echo one\necho two\necho three\n", ".sh");

    // Act
    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    // Assert - exact order, then exactly one terminal status line
    assert_eq!(
        display_texts(&events),
        vec!["one", "two", "three", "Process exited with code: 0"]
    );
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
}

#[tokio::test]
async fn test_zero_output_still_produces_status_line() {
    let registry = SessionRegistry::new();
    // `true` ignores its argument and exits 0 without output
    let quiet = Interpreter::custom("true", "true", ".txt");
    let script = script_file("ignored", ".txt");

    let mut handle = registry
        .start_session(quiet, ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    assert_eq!(display_texts(&events), vec!["Process exited with code: 0"]);
}

#[tokio::test]
async fn test_nonzero_exit_code_propagates_verbatim() {
    let registry = SessionRegistry::new();
    let script = script_file("echo failing\nexit 7\n", ".sh");

    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    assert_eq!(
        display_texts(&events),
        vec!["failing", "Process exited with code: 7"]
    );
    assert_eq!(
        registry.state(&handle.session_id).await.unwrap(),
        SessionState::Exited(7)
    );
}

#[tokio::test]
async fn test_stderr_is_merged_into_the_stream() {
    let registry = SessionRegistry::new();
    let script = script_file("echo to-stdout\necho to-stderr 1>&2\necho done\n", ".sh");

    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    // Sequential writes to the combined stream keep their order
    assert_eq!(
        display_texts(&events),
        vec!["to-stdout", "to-stderr", "done", "Process exited with code: 0"]
    );
}

#[tokio::test]
async fn test_trailing_line_without_newline_is_delivered() {
    let registry = SessionRegistry::new();
    let script = script_file("printf 'complete\\n'\nprintf 'partial'\n", ".sh");

    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    assert_eq!(
        display_texts(&events),
        vec!["complete", "partial", "Process exited with code: 0"]
    );
}

#[tokio::test]
async fn test_failed_launch_yields_one_status_line_and_no_output() {
    let registry = SessionRegistry::new();
    let ghost = Interpreter::custom("ghost", "scriptdeck-no-such-binary", ".x");

    let mut handle = registry
        .start_session(ghost, ScriptSource::File("/tmp/anything.x".into()))
        .await
        .expect("a failed launch still yields a session");
    let events = collect_events(&mut handle).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SessionEvent::Failed { .. }));
    assert!(events[0].display_text().starts_with("Execution failed:"));

    let state = registry.state(&handle.session_id).await.unwrap();
    assert!(matches!(state, SessionState::Failed(_)));
}

#[tokio::test]
async fn test_inline_code_round_trips_through_temp_file() {
    let registry = SessionRegistry::new();

    // cat prints the materialized file, so the output is the code itself;
    // non-ASCII and multi-line content must survive byte-for-byte
    let code = "première ligne\n日本語の行\nlast line";
    let mut handle = registry
        .start_session(cat(), ScriptSource::inline(code, "cat"))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    assert_eq!(
        display_texts(&events),
        vec![
            "première ligne",
            "日本語の行",
            "last line",
            "Process exited with code: 0"
        ]
    );
}

#[tokio::test]
async fn test_inline_run_reports_exit_through_interpreter() {
    let registry = SessionRegistry::new();

    let mut handle = registry
        .start_session(
            Interpreter::custom("sh", "sh", ".sh"),
            ScriptSource::inline("echo from-inline\nexit 3\n", "sh"),
        )
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    assert_eq!(
        display_texts(&events),
        vec!["from-inline", "Process exited with code: 3"]
    );
}

#[tokio::test]
async fn test_line_events_carry_sequential_numbers() {
    let registry = SessionRegistry::new();
    let script = script_file("echo a\necho b\necho c\n", ".sh");

    let mut handle = registry
        .start_session(sh(), ScriptSource::File(script.path().to_path_buf()))
        .await
        .expect("session should start");
    let events = collect_events(&mut handle).await;

    let numbers: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Line { line, .. } => Some(line.line_number),
            _ => None,
        })
        .collect();
    assert_eq!(numbers, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_missing_script_file_fails_via_interpreter_exit() {
    let registry = SessionRegistry::new();

    // The path vanished before launch: the interpreter starts, reports its
    // own error on the merged stream, and exits nonzero
    let mut handle = registry
        .start_session(
            sh(),
            ScriptSource::File("/nonexistent/scriptdeck/missing.sh".into()),
        )
        .await
        .expect("launch proceeds; the interpreter reports the missing file");
    let events = collect_events(&mut handle).await;

    let last = events.last().unwrap();
    match last {
        SessionEvent::Exited { exit_code, .. } => assert_ne!(*exit_code, 0),
        other => panic!("expected nonzero exit, got {:?}", other.display_text()),
    }
}
