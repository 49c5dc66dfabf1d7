//! Output Streamer
//!
//! Consumes a process's combined output stream incrementally on the session's
//! worker thread and forwards each newline-terminated chunk through the
//! ordered handoff channel. The streamer never waits for process exit; it
//! returns once the stream ends, and the caller performs the wait.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::exec::events::SessionEvent;
use crate::models::OutputLine;

/// Assembles raw byte chunks into complete text lines.
///
/// Bytes are buffered across chunk boundaries, so multi-byte UTF-8 sequences
/// split between reads decode correctly and the emitted line sequence is
/// independent of how the stream was chunked. A `\r` preceding the newline
/// (PTY line discipline emits `\r\n`) is stripped along with it.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8>,
}

impl LineAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns the lines completed by this chunk
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Flush a trailing unterminated chunk at end-of-stream, if any
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Read the combined stream to its end, forwarding one `SessionEvent::Line`
/// per output line, in production order.
///
/// Returns the number of lines forwarded. Read errors other than EINTR and
/// the PTY's end-of-stream EIO are surfaced as one synthetic final line, then
/// the stream is treated as ended. Once `cancel` is set no further lines are
/// forwarded.
pub fn stream_lines(
    mut reader: Box<dyn Read + Send>,
    tx: &UnboundedSender<SessionEvent>,
    session_id: &str,
    cancel: &Arc<AtomicBool>,
) -> usize {
    let mut assembler = LineAssembler::new();
    let mut line_number = 0usize;
    let mut buf = [0u8; 4096];

    let forward = |text: String, line_number: &mut usize| {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        let event = SessionEvent::Line {
            session_id: session_id.to_string(),
            line: OutputLine::new(text, *line_number),
        };
        *line_number += 1;
        if tx.send(event).is_err() {
            debug!("Session {}: event receiver dropped", session_id);
        }
    };

    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("Session {}: stream reached end-of-data", session_id);
                break;
            }
            Ok(n) => {
                for text in assembler.push(&buf[..n]) {
                    forward(text, &mut line_number);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {
                continue;
            }
            Err(ref e) if e.raw_os_error() == Some(5) => {
                // PTY masters fail with EIO once the child closes its side;
                // that is end-of-stream, not a read failure
                debug!("Session {}: stream closed by child (EIO)", session_id);
                break;
            }
            Err(e) => {
                warn!("Session {}: stream read error: {}", session_id, e);
                forward(format!("Stream error: {}", e), &mut line_number);
                return line_number;
            }
        }
    }

    if let Some(text) = assembler.finish() {
        forward(text, &mut line_number);
    }

    line_number
}
