// 🧵 SSE Line Codec - reassemble `data:` lines across network reads
//
// Reads arrive in arbitrary chunks. A chunk may end mid-line, or even in
// the middle of a multibyte UTF-8 character, so bytes are buffered and only
// complete lines are decoded. The trailing fragment waits for the next read
// or for `finish()` at end of stream.

use super::event::StreamEvent;
use tracing::warn;

pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        LineBuffer {
            pending: Vec::new(),
        }
    }

    /// Append a chunk and drain every complete line it finished
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);

        lines
    }

    /// Flush the trailing fragment at end of stream
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = decode_line(&self.pending);
        self.pending.clear();
        Some(line)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parse one line into an event.
///
/// Returns `None` for lines that carry no event (blank separators,
/// `:` comments, `event:`/`id:` fields) and for malformed JSON, which is
/// logged and skipped.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, line = payload, "skipping malformed SSE data line");
            None
        }
    }
}

/// Encode an event as one SSE frame: `data: {json}` and a blank line
pub fn encode_event(event: &StreamEvent) -> serde_json::Result<String> {
    Ok(format!("{}{}\n\n", DATA_PREFIX, serde_json::to_string(event)?))
}

/// Decodes a whole byte stream into events, chunk by chunk
#[derive(Debug, Default)]
pub struct EventDecoder {
    lines: LineBuffer,
}

impl EventDecoder {
    pub fn new() -> Self {
        EventDecoder {
            lines: LineBuffer::new(),
        }
    }

    pub fn decode(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.lines
            .push(chunk)
            .iter()
            .filter_map(|line| parse_line(line))
            .collect()
    }

    pub fn finish(&mut self) -> Option<StreamEvent> {
        self.lines.finish().and_then(|line| parse_line(&line))
    }
}

// ============================================================================
// TESTS
// ============================================================================
