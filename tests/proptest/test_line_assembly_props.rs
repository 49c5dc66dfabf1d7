//! Property-Based Tests for Line Assembly
//!
//! The ordering invariant of the output streamer rests on the line
//! assembler: however the byte stream is chunked by the OS, the emitted
//! line sequence must be identical, with nothing reordered or dropped.

use proptest::prelude::*;

use scriptdeck::exec::LineAssembler;

/// Feed `bytes` to a fresh assembler in chunks of the given sizes (cycled),
/// returning every emitted line including the trailing partial one.
fn assemble_chunked(bytes: &[u8], chunk_sizes: &[usize]) -> Vec<String> {
    let mut assembler = LineAssembler::new();
    let mut lines = Vec::new();

    let mut offset = 0;
    let mut size_index = 0;
    while offset < bytes.len() {
        let size = chunk_sizes[size_index % chunk_sizes.len()].max(1);
        let end = (offset + size).min(bytes.len());
        lines.extend(assembler.push(&bytes[offset..end]));
        offset = end;
        size_index += 1;
    }

    if let Some(rest) = assembler.finish() {
        lines.push(rest);
    }
    lines
}

/// Lines without newline or carriage-return bytes, including non-ASCII text
fn line_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .:èéüñ日本語🦀-]{0,40}"
}

proptest! {
    /// Any chunking of the same byte stream yields the same line sequence
    #[test]
    fn chunking_never_changes_the_line_sequence(
        lines in prop::collection::vec(line_strategy(), 0..20),
        trailing_newline in any::<bool>(),
        chunk_sizes in prop::collection::vec(1usize..16, 1..8),
    ) {
        let mut stream = lines.join("\n");
        if trailing_newline && !stream.is_empty() {
            stream.push('\n');
        }

        let chunked = assemble_chunked(stream.as_bytes(), &chunk_sizes);
        let whole = assemble_chunked(stream.as_bytes(), &[stream.len().max(1)]);
        prop_assert_eq!(&chunked, &whole);

        // And both match the stream's line content: every newline terminates
        // a line, and a trailing unterminated chunk is one final line
        let expected: Vec<String> = if stream.is_empty() {
            Vec::new()
        } else {
            let mut parts: Vec<String> = stream.split('\n').map(str::to_string).collect();
            if stream.ends_with('\n') {
                parts.pop();
            }
            parts
        };
        prop_assert_eq!(chunked, expected);
    }

    /// CRLF streams assemble to the same lines as LF streams
    #[test]
    fn crlf_and_lf_streams_are_equivalent(
        lines in prop::collection::vec(line_strategy(), 1..20),
        chunk_sizes in prop::collection::vec(1usize..16, 1..8),
    ) {
        let lf = format!("{}\n", lines.join("\n"));
        let crlf = format!("{}\r\n", lines.join("\r\n"));

        let from_lf = assemble_chunked(lf.as_bytes(), &chunk_sizes);
        let from_crlf = assemble_chunked(crlf.as_bytes(), &chunk_sizes);
        prop_assert_eq!(from_lf, from_crlf);
    }

    /// Byte-at-a-time delivery, the worst case a PTY can produce, still
    /// yields the exact line sequence
    #[test]
    fn single_byte_chunks_preserve_everything(
        lines in prop::collection::vec(line_strategy(), 0..10),
    ) {
        let stream = if lines.is_empty() {
            String::new()
        } else {
            format!("{}\n", lines.join("\n"))
        };

        let assembled = assemble_chunked(stream.as_bytes(), &[1]);
        prop_assert_eq!(assembled, lines);
    }
}
