//! Incremental newline-framed JSON decoding.

use tracing::{debug, warn};

use crate::messages::ProgramMessage;

/// Cap on buffered bytes without a newline; a child spewing an endless
/// unterminated line gets truncated rather than growing the buffer forever.
const MAX_BUFFERED: usize = 64 * 1024;

/// Accumulates raw pipe bytes and yields complete messages.
///
/// Partial lines persist across frames; the per-frame read pass simply
/// appends whatever arrived and drains whole lines.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: String,
}

impl LineDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the pipe.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        if self.buffer.len() > MAX_BUFFERED && !self.buffer.contains('\n') {
            warn!(len = self.buffer.len(), "unterminated IPC line, dropping buffer");
            self.buffer.clear();
        }
    }

    /// Consume complete lines, parsing each as a message. Malformed JSON is
    /// discarded with a warning; unknown message types come back as
    /// [`ProgramMessage::Unknown`].
    pub fn drain_messages(&mut self) -> Vec<ProgramMessage> {
        let mut messages = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<ProgramMessage>(line) {
                Ok(ProgramMessage::Unknown) => {
                    debug!(line, "ignoring unknown IPC message type");
                }
                Ok(message) => messages.push(message),
                Err(err) => {
                    warn!(%err, line, "discarding malformed IPC line");
                }
            }
        }

        messages
    }

    /// Bytes currently held without a terminating newline.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_lines_persist() {
        let mut decoder = LineDecoder::new();
        decoder.push_bytes(b"{\"type\":\"ready\",\"pro");
        assert!(decoder.drain_messages().is_empty());
        assert!(decoder.pending() > 0);

        decoder.push_bytes(b"ject\":\"X\"}\n");
        let messages = decoder.drain_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_multiple_messages_in_one_read() {
        let mut decoder = LineDecoder::new();
        decoder.push_bytes(b"{\"type\":\"status\",\"message\":\"a\"}\n{\"type\":\"status\",\"message\":\"b\"}\n");
        assert_eq!(decoder.drain_messages().len(), 2);
    }

    #[test]
    fn test_malformed_line_discarded() {
        let mut decoder = LineDecoder::new();
        decoder.push_bytes(b"not json at all\n{\"type\":\"shutdown\"}\n");
        let messages = decoder.drain_messages();
        assert_eq!(messages, vec![ProgramMessage::Shutdown]);
    }

    #[test]
    fn test_unknown_type_dropped_silently() {
        let mut decoder = LineDecoder::new();
        decoder.push_bytes(b"{\"type\":\"future_thing\",\"x\":1}\n");
        assert!(decoder.drain_messages().is_empty());
    }
}
