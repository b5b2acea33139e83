//! Stream header adapter
//!
//! Each streamed exchange is bounded by headers: the host writes a
//! `key: value` block before the input data region, and the command answers
//! with a severity-tagged messages block before its output rows. Both blocks
//! end with one blank line.

use sluice_core::{InputHeader, MessagesHeader, ProtocolFramingError, ProtocolResult};
use std::io::{BufRead, Write};

/// Read the input header block preceding the data region.
///
/// A line without a `:` continues the previous entry's value. Reaching end of
/// stream before the blank-line terminator is a framing error.
pub fn read_input_header<R: BufRead>(reader: &mut R) -> ProtocolResult<InputHeader> {
    let mut header = InputHeader::new();
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Err(ProtocolFramingError::MissingHeaderTerminator.into());
        }

        let content = trim_line_end(&line);
        if content.is_empty() {
            return Ok(header);
        }

        match content.split_once(':') {
            Some((key, value)) => header.insert(key.trim(), value.trim_start()),
            None => {
                if !header.append_to_last(content) {
                    return Err(ProtocolFramingError::MalformedHeaderLine {
                        line: content.to_string(),
                    }
                    .into());
                }
            }
        }
    }
}

/// Serialize a messages header block: one `severity: text` line per message,
/// then the blank-line terminator. Newlines inside a message would break the
/// framing, so they are flattened to spaces.
pub fn format_messages_header(header: &MessagesHeader) -> String {
    let mut out = String::new();
    for message in header.messages() {
        out.push_str(message.severity.as_str());
        out.push_str(": ");
        for c in message.text.chars() {
            out.push(if c == '\n' || c == '\r' { ' ' } else { c });
        }
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Write a messages header block as one unit and flush it.
pub fn write_messages_header<W: Write>(
    writer: &mut W,
    header: &MessagesHeader,
) -> ProtocolResult<()> {
    writer.write_all(format_messages_header(header).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Strip the trailing newline (and carriage return) from one read line.
pub(crate) fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(|c| c == '\n' || c == '\r')
}

// =============================================================================
// TESTS
// =============================================================================
